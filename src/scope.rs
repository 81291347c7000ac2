use oauth2::Scope as OAuth2Scope;
use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

/// Represents permission level for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ReadWrite,
    ReadOnly,
}

/// Scopes the accounting adapter knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeType {
    OpenId,
    Profile,
    Email,
    /// Required for Xero to hand out a refresh token.
    OfflineAccess,
    AccountingTransactions(Permission),
    AccountingReports,
    AccountingJournals,
    AccountingSettings(Permission),
    AccountingContacts(Permission),
    AccountingAttachments(Permission),
}

impl ScopeType {
    fn as_str(self) -> &'static str {
        match self {
            Self::OpenId => "openid",
            Self::Profile => "profile",
            Self::Email => "email",
            Self::OfflineAccess => "offline_access",
            Self::AccountingTransactions(Permission::ReadWrite) => "accounting.transactions",
            Self::AccountingTransactions(Permission::ReadOnly) => "accounting.transactions.read",
            Self::AccountingReports => "accounting.reports.read",
            Self::AccountingJournals => "accounting.journals.read",
            Self::AccountingSettings(Permission::ReadWrite) => "accounting.settings",
            Self::AccountingSettings(Permission::ReadOnly) => "accounting.settings.read",
            Self::AccountingContacts(Permission::ReadWrite) => "accounting.contacts",
            Self::AccountingContacts(Permission::ReadOnly) => "accounting.contacts.read",
            Self::AccountingAttachments(Permission::ReadWrite) => "accounting.attachments",
            Self::AccountingAttachments(Permission::ReadOnly) => "accounting.attachments.read",
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a scope from a string
#[derive(Debug, Clone)]
pub struct ParseScopeError(String);

impl fmt::Display for ParseScopeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid scope string: {}", self.0)
    }
}

impl std::error::Error for ParseScopeError {}

impl FromStr for ScopeType {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openid" => Ok(Self::OpenId),
            "profile" => Ok(Self::Profile),
            "email" => Ok(Self::Email),
            "offline_access" => Ok(Self::OfflineAccess),
            "accounting.transactions" => Ok(Self::AccountingTransactions(Permission::ReadWrite)),
            "accounting.transactions.read" => Ok(Self::AccountingTransactions(Permission::ReadOnly)),
            "accounting.reports.read" => Ok(Self::AccountingReports),
            "accounting.journals.read" => Ok(Self::AccountingJournals),
            "accounting.settings" => Ok(Self::AccountingSettings(Permission::ReadWrite)),
            "accounting.settings.read" => Ok(Self::AccountingSettings(Permission::ReadOnly)),
            "accounting.contacts" => Ok(Self::AccountingContacts(Permission::ReadWrite)),
            "accounting.contacts.read" => Ok(Self::AccountingContacts(Permission::ReadOnly)),
            "accounting.attachments" => Ok(Self::AccountingAttachments(Permission::ReadWrite)),
            "accounting.attachments.read" => Ok(Self::AccountingAttachments(Permission::ReadOnly)),
            _ => Err(ParseScopeError(s.to_string())),
        }
    }
}

/// The set of scopes requested when (re)authorizing the app.
///
/// Scopes are kept as raw strings so that ones this crate has no [`ScopeType`] for
/// (payroll, projects, ...) still pass through from configuration unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    scopes: Vec<OAuth2Scope>,
}

impl Scope {
    #[must_use]
    pub fn new(scope_types: Vec<ScopeType>) -> Self {
        scope_types.into_iter().collect()
    }

    /// Parses a `XERO_SCOPES` style list. Commas and whitespace both separate entries.
    #[must_use]
    pub fn from_list(list: &str) -> Self {
        let scopes = list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.parse::<ScopeType>().is_err() {
                    debug!(scope = s, "passing through unrecognised scope");
                }
                OAuth2Scope::new(s.to_string())
            })
            .collect();
        Self { scopes }
    }

    /// The default set for the accounting adapter.
    #[must_use]
    pub fn accounting_defaults() -> Self {
        Self::new(vec![
            ScopeType::OpenId,
            ScopeType::Profile,
            ScopeType::Email,
            ScopeType::OfflineAccess,
            ScopeType::AccountingTransactions(Permission::ReadWrite),
            ScopeType::AccountingReports,
            ScopeType::AccountingSettings(Permission::ReadOnly),
            ScopeType::AccountingContacts(Permission::ReadWrite),
        ])
    }

    #[must_use]
    pub fn add(mut self, scope_type: ScopeType) -> Self {
        self.scopes.push(OAuth2Scope::new(scope_type.to_string()));
        self
    }

    #[must_use]
    pub fn contains(&self, scope_type: ScopeType) -> bool {
        self.scopes.iter().any(|s| s.as_str() == scope_type.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    #[must_use]
    pub fn as_oauth2_scopes(&self) -> &[OAuth2Scope] {
        &self.scopes
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .scopes
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&joined)
    }
}

impl From<ScopeType> for Scope {
    fn from(scope_type: ScopeType) -> Self {
        Self::new(vec![scope_type])
    }
}

impl FromIterator<ScopeType> for Scope {
    fn from_iter<I: IntoIterator<Item = ScopeType>>(iter: I) -> Self {
        let scopes = iter
            .into_iter()
            .map(|st| OAuth2Scope::new(st.to_string()))
            .collect();
        Self { scopes }
    }
}
