//! Access Context - Policy & Evaluation

use std::collections::BTreeSet;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::media::MediaLocator;

/// 访问策略
///
/// 每次评估时不可变；两次加载之间可以整体替换
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default)]
    pub enable_domain_check: bool,

    #[serde(default)]
    pub enable_referrer_check: bool,

    /// 允许的执行来源主机名
    #[serde(default)]
    pub allowed_domains: BTreeSet<String>,

    /// 允许的 Referer 前缀
    #[serde(default)]
    pub allowed_referrers: BTreeSet<String>,
}

impl AccessPolicy {
    /// 完全放开的策略
    pub fn open() -> Self {
        Self::default()
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enable_domain_check = true;
        self.allowed_domains = domains.into_iter().map(Into::into).collect();
        self.normalized()
    }

    pub fn with_referrers<I, S>(mut self, referrers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enable_referrer_check = true;
        self.allowed_referrers = referrers.into_iter().map(Into::into).collect();
        self.normalized()
    }

    /// 域名去空白并转小写，Referer 去空白，丢弃空项
    pub fn normalized(self) -> Self {
        Self {
            enable_domain_check: self.enable_domain_check,
            enable_referrer_check: self.enable_referrer_check,
            allowed_domains: self
                .allowed_domains
                .into_iter()
                .map(|d| d.trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            allowed_referrers: self
                .allowed_referrers
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }
}

/// 当前执行上下文（来源 + Referer）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub origin: Option<String>,
    pub referrer: Option<String>,
}

impl RequestContext {
    pub fn new(origin: Option<String>, referrer: Option<String>) -> Self {
        Self { origin, referrer }
    }

    /// 来源主机名（小写，去端口）
    pub fn origin_host(&self) -> Option<String> {
        let origin = self.origin.as_deref()?.trim();
        if origin.is_empty() {
            return None;
        }
        let host = if origin.contains("://") {
            Url::parse(origin).ok()?.host_str()?.to_string()
        } else {
            origin.split(':').next().unwrap_or_default().to_string()
        };
        Some(host.to_ascii_lowercase())
    }
}

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("当前域名不在允许列表中")]
    DomainNotAllowed,

    #[error("缺少来源页面信息")]
    NoReferrer,

    #[error("来源页面不在允许列表中")]
    ReferrerNotAllowed,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DomainNotAllowed => "domain_not_allowed",
            Self::NoReferrer => "no_referrer",
            Self::ReferrerNotAllowed => "referrer_not_allowed",
        }
    }
}

/// 门控结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// 评估访问策略
///
/// 两项检查相互独立且都必须通过；域名检查先于 Referer 检查。
pub fn evaluate(
    policy: &AccessPolicy,
    context: &RequestContext,
    locator: &MediaLocator,
) -> AccessDecision {
    if policy.enable_domain_check {
        let allowed = context
            .origin_host()
            .map(|host| {
                policy
                    .allowed_domains
                    .iter()
                    .any(|d| d.eq_ignore_ascii_case(&host))
            })
            .unwrap_or(false);
        if !allowed {
            tracing::debug!(origin = ?context.origin, locator = %locator, "Domain check denied");
            return AccessDecision::Deny(DenyReason::DomainNotAllowed);
        }
    }

    if policy.enable_referrer_check && !policy.allowed_referrers.is_empty() {
        let referrer = context.referrer.as_deref().unwrap_or_default().trim();
        if referrer.is_empty() {
            return AccessDecision::Deny(DenyReason::NoReferrer);
        }
        if !policy
            .allowed_referrers
            .iter()
            .any(|prefix| referrer.starts_with(prefix.as_str()))
        {
            tracing::debug!(referrer = %referrer, locator = %locator, "Referrer check denied");
            return AccessDecision::Deny(DenyReason::ReferrerNotAllowed);
        }
    }

    AccessDecision::Allow
}
