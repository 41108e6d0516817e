// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! `messages` collection queries

use serde_json::{json, Map, Value};

use crate::config::constants::EXT_OUT_MESSAGE_TYPE;
use crate::errors::TransportError;
use crate::transport::GqlRequest;
use crate::types::bound::{Direction, PageBound};
use crate::types::wire::WireEvent;

const MESSAGES_QUERY: &str = "query($filter: MessageFilter, $orderBy: [QueryOrderBy], $limit: Int) \
{ messages(filter: $filter, orderBy: $orderBy, limit: $limit) \
{ id created_at created_lt src dst body } }";

/// One page request against the `messages` collection
#[derive(Debug, Clone)]
pub(crate) struct PageQuery<'a> {
    pub(crate) contract: &'a str,
    pub(crate) counterparty: Option<&'a str>,
    pub(crate) direction: Direction,
    /// Lower end in `direction`; the continuation anchor after the first page
    pub(crate) from: Option<&'a PageBound>,
    pub(crate) to: Option<&'a PageBound>,
    pub(crate) limit: usize,
}

impl PageQuery<'_> {
    /// `created_lt` filter for the window
    ///
    /// Descending: `from` is an upper bound and `to` a lower one. Ascending
    /// flips both.
    fn created_lt_filter(&self) -> Option<Value> {
        let mut filter = Map::new();

        if let Some(from) = self.from {
            let op = match (self.direction, from.inclusive) {
                (Direction::Desc, false) => "lt",
                (Direction::Desc, true) => "le",
                (Direction::Asc, false) => "gt",
                (Direction::Asc, true) => "ge",
            };
            filter.insert(op.into(), from.logical_time().to_query_value().into());
        }
        if let Some(to) = self.to {
            let op = match (self.direction, to.inclusive) {
                (Direction::Desc, false) => "gt",
                (Direction::Desc, true) => "ge",
                (Direction::Asc, false) => "lt",
                (Direction::Asc, true) => "le",
            };
            filter.insert(op.into(), to.logical_time().to_query_value().into());
        }

        (!filter.is_empty()).then_some(Value::Object(filter))
    }

    pub(crate) fn to_request(&self) -> GqlRequest {
        let mut filter = Map::new();
        filter.insert("msg_type".into(), json!({ "eq": EXT_OUT_MESSAGE_TYPE }));
        filter.insert("src".into(), json!({ "eq": self.contract }));
        if let Some(dst) = self.counterparty {
            filter.insert("dst".into(), json!({ "eq": dst }));
        }
        if let Some(created_lt) = self.created_lt_filter() {
            filter.insert("created_lt".into(), created_lt);
        }

        GqlRequest::new(MESSAGES_QUERY).with_variables(json!({
            "filter": filter,
            "orderBy": [{ "path": "created_lt", "direction": self.direction.as_graphql() }],
            "limit": self.limit,
        }))
    }
}

/// Events of a `messages` response, in server order
pub(crate) fn parse_page(data: &Value) -> Result<Vec<WireEvent>, TransportError> {
    let messages = data
        .get("messages")
        .ok_or_else(|| TransportError::malformed("response has no messages"))?;
    serde_json::from_value(messages.clone())
        .map_err(|e| TransportError::malformed(format!("invalid messages: {e}")))
}
