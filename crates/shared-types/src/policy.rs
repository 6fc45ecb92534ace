//! # Resource Policies
//!
//! Access policy documents attached to the queue and the topic.
//!
//! Only the subset the pipeline writes is modelled: service principals,
//! explicit actions and resources, and `aws:SourceArn` conditions. The
//! evaluator answers one question: may this service principal perform this
//! action on this resource on behalf of this source ARN?

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Policy language version written into every document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Condition key naming the resource that triggered a service-to-service call.
pub const SOURCE_ARN_KEY: &str = "aws:SourceArn";

/// A resource policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Document with the given statements.
    pub fn new(statement: Vec<PolicyStatement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            id: None,
            statement,
        }
    }

    /// Parse a policy attribute value.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize as a policy attribute value.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Whether any `Allow` statement grants the request.
    ///
    /// No wildcard principal or resource is honoured: a statement applies
    /// only when it names the service principal and resource exactly.
    #[must_use]
    pub fn allows(&self, service: &str, action: &str, resource: &str, source_arn: &str) -> bool {
        self.statement
            .iter()
            .any(|s| s.effect == Effect::Allow && s.matches(service, action, resource, source_arn))
    }

    /// Every statement's resource (for scoping checks).
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.statement.iter().map(|s| s.resource.as_str())
    }
}

/// `Allow` or `Deny`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Principal naming a managed service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    pub service: String,
}

/// A single policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    pub principal: Principal,
    pub action: String,
    pub resource: String,
    /// Operator → (key → value).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub condition: BTreeMap<String, BTreeMap<String, String>>,
}

impl PolicyStatement {
    /// `Allow` statement for `service` to perform `action` on `resource`,
    /// restricted to requests originating from `source_arn`.
    pub fn allow_from_source(
        sid: impl Into<String>,
        service: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
        source_arn: impl Into<String>,
    ) -> Self {
        let mut inner = BTreeMap::new();
        inner.insert(SOURCE_ARN_KEY.to_string(), source_arn.into());
        let mut condition = BTreeMap::new();
        condition.insert("ArnEquals".to_string(), inner);
        Self {
            sid: Some(sid.into()),
            effect: Effect::Allow,
            principal: Principal {
                service: service.into(),
            },
            action: action.into(),
            resource: resource.into(),
            condition,
        }
    }

    fn matches(&self, service: &str, action: &str, resource: &str, source_arn: &str) -> bool {
        self.principal.service == service
            && self.action.eq_ignore_ascii_case(action)
            && self.resource == resource
            && self.conditions_hold(source_arn)
    }

    fn conditions_hold(&self, source_arn: &str) -> bool {
        self.condition.iter().all(|(operator, entries)| {
            entries.iter().all(|(key, expected)| {
                if key != SOURCE_ARN_KEY {
                    return false;
                }
                match operator.as_str() {
                    "ArnEquals" | "StringEquals" => expected == source_arn,
                    "ArnLike" | "StringLike" => glob_match(expected, source_arn),
                    _ => false,
                }
            })
        })
    }
}

/// `*` matches any run of characters, `?` exactly one.
fn glob_match(pattern: &str, value: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let v: Vec<char> = value.chars().collect();
    let (mut pi, mut vi) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while vi < v.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == v[vi]) {
            pi += 1;
            vi += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, vi));
            pi += 1;
        } else if let Some((sp, sv)) = star {
            pi = sp + 1;
            vi = sv + 1;
            star = Some((sp, sv + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}
