//! User identity aggregated over all authentications of a context.

use layergate_authorization::Authentication;
use serde::{Deserialize, Serialize};

const SEPARATOR: &str = ", ";

/// Identity of the user behind a token.
///
/// When several security services authenticate the same token, text fields
/// are concatenated with `", "` while values already present are skipped.
/// The locale is kept only when every service specifying one agrees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    /// User id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Locale, e.g. `nl_BE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Division within the organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
}

impl UserInfo {
    /// Take the user info of a single authentication.
    pub fn of(authentication: &Authentication) -> Self {
        Self {
            id: authentication.user_id().map(str::to_string),
            name: authentication.user_name().map(str::to_string),
            locale: authentication.user_locale().map(str::to_string),
            organization: authentication.user_organization().map(str::to_string),
            division: authentication.user_division().map(str::to_string),
        }
    }

    /// Aggregate the user info of all authentications.
    pub fn combine_all(authentications: &[Authentication]) -> Self {
        let mut info = Self::default();
        let mut locale_conflict = false;

        for authentication in authentications {
            info.id = combine(info.id.take(), authentication.user_id());
            info.name = combine(info.name.take(), authentication.user_name());
            info.organization = combine(info.organization.take(), authentication.user_organization());
            info.division = combine(info.division.take(), authentication.user_division());

            if let Some(locale) = authentication.user_locale() {
                if info.locale.is_none() && !locale_conflict {
                    info.locale = Some(locale.to_string());
                } else if info.locale.as_deref() != Some(locale) {
                    info.locale = None;
                    locale_conflict = true;
                }
            }
        }

        info
    }

    /// Check if no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Append the items of `add` not yet present in `current`.
///
/// Both values are read as `", "` separated lists, so adding a value that is
/// already the whole, a prefix or a suffix of `current` changes nothing.
fn combine(current: Option<String>, add: Option<&str>) -> Option<String> {
    let add = match add {
        Some(add) if !add.is_empty() => add,
        _ => return current,
    };

    let Some(mut current) = current.filter(|c| !c.is_empty()) else {
        return Some(add.to_string());
    };

    let mut items: Vec<&str> = current.split(SEPARATOR).collect();
    let mut appended = Vec::new();
    for item in add.split(SEPARATOR) {
        if !items.contains(&item) {
            items.push(item);
            appended.push(item);
        }
    }

    for item in appended {
        current.push_str(SEPARATOR);
        current.push_str(item);
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authentication(service: &str) -> Authentication {
        Authentication::new(service).unwrap()
    }

    #[test]
    fn test_combine_skips_present_values() {
        assert_eq!(combine(Some("bob".into()), Some("bob")), Some("bob".into()));
        assert_eq!(
            combine(Some("bob".into()), Some("bob, alice")),
            Some("bob, alice".into())
        );
        assert_eq!(
            combine(Some("bob, alice".into()), Some("alice")),
            Some("bob, alice".into())
        );
        assert_eq!(
            combine(Some("bob".into()), Some("carol")),
            Some("bob, carol".into())
        );
    }

    #[test]
    fn test_combine_with_missing_values() {
        assert_eq!(combine(None, Some("bob")), Some("bob".into()));
        assert_eq!(combine(Some("bob".into()), None), Some("bob".into()));
        assert_eq!(combine(Some("bob".into()), Some("")), Some("bob".into()));
        assert_eq!(combine(None, None), None);
    }

    #[test]
    fn test_combine_all_user_ids() {
        let info = UserInfo::combine_all(&[
            authentication("x").with_user_id("bob").with_user_name("Bob"),
            authentication("y").with_user_id("bob"),
            authentication("z").with_user_id("bob, alice").with_user_organization("Acme"),
        ]);

        assert_eq!(info.id.as_deref(), Some("bob, alice"));
        assert_eq!(info.name.as_deref(), Some("Bob"));
        assert_eq!(info.organization.as_deref(), Some("Acme"));
        assert_eq!(info.division, None);
    }

    #[test]
    fn test_locale_requires_agreement() {
        let agreeing = UserInfo::combine_all(&[
            authentication("x").with_user_locale("nl_BE"),
            authentication("y"),
            authentication("z").with_user_locale("nl_BE"),
        ]);
        assert_eq!(agreeing.locale.as_deref(), Some("nl_BE"));

        let conflicting = UserInfo::combine_all(&[
            authentication("x").with_user_locale("nl_BE"),
            authentication("y").with_user_locale("fr_BE"),
            authentication("z").with_user_locale("nl_BE"),
        ]);
        assert_eq!(conflicting.locale, None);
    }

    #[test]
    fn test_empty() {
        assert!(UserInfo::combine_all(&[]).is_empty());
        assert!(UserInfo::of(&authentication("x")).is_empty());
        assert!(!UserInfo::of(&authentication("x").with_user_id("bob")).is_empty());
    }
}
