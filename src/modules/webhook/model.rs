use serde::Deserialize;

use crate::modules::user::model::UpsertUser;

/// Envelope of every identity-provider webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct EmailAddress {
    pub id: String,
    pub email_address: String,
}

/// `data` of `user.created` / `user.updated`.
#[derive(Debug, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProviderUser {
    pub fn primary_email(&self) -> Option<&str> {
        let primary = self.primary_email_address_id.as_deref().and_then(|primary| {
            self.email_addresses.iter().find(|address| address.id == primary)
        });

        primary.or_else(|| self.email_addresses.first()).map(|address| address.email_address.as_str())
    }

    pub fn display_name(&self, email: &str) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            email.split('@').next().unwrap_or(email).to_string()
        } else {
            parts.join(" ")
        }
    }

    /// `None` when the provider sent no email address at all.
    pub fn into_upsert(self) -> Option<UpsertUser> {
        let email = self.primary_email()?.to_string();
        let username = self.display_name(&email);

        Some(UpsertUser {
            external_id: self.id,
            username,
            email,
            image_url: self.image_url.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>) -> ProviderUser {
        ProviderUser {
            id: "user_1".into(),
            first_name: first.map(Into::into),
            last_name: last.map(Into::into),
            email_addresses: vec![
                EmailAddress { id: "e1".into(), email_address: "first@example.com".into() },
                EmailAddress { id: "e2".into(), email_address: "primary@example.com".into() },
            ],
            primary_email_address_id: Some("e2".into()),
            image_url: None,
        }
    }

    #[test]
    fn prefers_primary_email_address() {
        assert_eq!(user(None, None).primary_email(), Some("primary@example.com"));

        let mut no_primary = user(None, None);
        no_primary.primary_email_address_id = None;
        assert_eq!(no_primary.primary_email(), Some("first@example.com"));
    }

    #[test]
    fn username_skips_blank_parts_and_falls_back_to_email() {
        let upsert = user(Some("Ann"), Some("Lee")).into_upsert().unwrap();
        assert_eq!(upsert.username, "Ann Lee");

        let upsert = user(Some("Ann"), Some("  ")).into_upsert().unwrap();
        assert_eq!(upsert.username, "Ann");

        let upsert = user(None, None).into_upsert().unwrap();
        assert_eq!(upsert.username, "primary");
        assert_eq!(upsert.image_url, "");
    }
}
