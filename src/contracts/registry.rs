// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use super::{normalize_address, ContractDescriptor};
use crate::errors::ConfigError;

/// Known mailer contracts, addressable by id and by address
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    contracts: Vec<ContractDescriptor>,
    by_id: HashMap<u16, usize>,
    by_address: HashMap<String, usize>,
}

impl ContractRegistry {
    /// Build a registry
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateContractId`] if two descriptors share an id
    pub fn new(contracts: Vec<ContractDescriptor>) -> Result<Self, ConfigError> {
        let mut by_id = HashMap::with_capacity(contracts.len());
        let mut by_address = HashMap::with_capacity(contracts.len());

        for (index, contract) in contracts.iter().enumerate() {
            if by_id.insert(contract.id, index).is_some() {
                return Err(ConfigError::DuplicateContractId { id: contract.id });
            }
            by_address.insert(contract.address.clone(), index);
        }

        Ok(Self {
            contracts,
            by_id,
            by_address,
        })
    }

    #[must_use]
    pub fn by_id(&self, id: u16) -> Option<&ContractDescriptor> {
        self.by_id.get(&id).and_then(|&index| self.contracts.get(index))
    }

    #[must_use]
    pub fn by_address(&self, address: &str) -> Option<&ContractDescriptor> {
        self.by_address
            .get(&normalize_address(address))
            .and_then(|&index| self.contracts.get(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContractDescriptor> {
        self.contracts.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}
