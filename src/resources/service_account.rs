//! Service accounts.
//!
//! The server only reveals a generated password in the response to the
//! create call; later reads omit it, so state keeps the first value seen.

use crate::kind::{Identity, KindDefinition};
use crate::resources::BasicKind;
use crate::schema::{Attribute, Schema};
use crate::transport::ApiPath;

/// The `service_account` kind.
pub fn service_account() -> BasicKind {
    let schema = Schema::v0()
        .with_description("A non-human account for programmatic access")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("service_account_id", Attribute::computed_string())
        .with_attribute("username", Attribute::required_string().with_force_new())
        .with_attribute(
            "with_initial_password",
            Attribute::request_only_bool().with_description("Generate a password on create"),
        )
        .with_attribute(
            "password",
            Attribute::computed_string().sensitive().retain_prior(),
        )
        .with_attribute("additional_role_ids", Attribute::optional_string_set())
        .with_attribute("created_on", Attribute::computed_string());
    BasicKind::new(KindDefinition::new(
        "service_account",
        ApiPath::new("/serviceAccount"),
        Identity::mirrored("serviceAccountId", "service_account_id"),
        schema,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::kind::ResourceKind;
    use crate::projector::project_response;
    use crate::record::Record;
    use crate::value::Attr;
    use serde_json::json;

    #[test]
    fn test_password_survives_later_reads() {
        let kind = service_account();
        let mut record = Record::null_for(&kind.definition().schema.block)
            .with_attr("id", Attr::Unknown)
            .with_attr("service_account_id", Attr::Unknown)
            .with_attr("password", Attr::Unknown)
            .with_attr("created_on", Attr::Unknown)
            .with("username", "etl")
            .with("with_initial_password", true);

        let created = json!({
            "serviceAccountId": "sa-1",
            "username": "etl",
            "password": "generated",
            "createdOn": "2024-01-01T00:00:00Z",
        });
        let mut diags = Diagnostics::new();
        project_response(&kind, &mut record, created.as_object().unwrap(), true, &mut diags)
            .unwrap();
        assert_eq!(record.get_str("password"), Some("generated"));

        let read = json!({"serviceAccountId": "sa-1", "username": "etl"});
        project_response(&kind, &mut record, read.as_object().unwrap(), false, &mut diags)
            .unwrap();
        assert_eq!(record.get_str("password"), Some("generated"));
        assert_eq!(record.get_bool("with_initial_password"), Some(true));
        assert!(record.get("created_on").is_null());
    }
}
