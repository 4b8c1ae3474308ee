//! Scheduled SQL jobs.

use crate::diagnostics::Diagnostics;
use crate::kind::{Identity, KindDefinition, ResourceKind};
use crate::record::Record;
use crate::schema::{Attribute, Schema};
use crate::transport::ApiPath;

/// The `sql_job` kind.
#[derive(Debug, Clone)]
pub struct SqlJob(KindDefinition);

/// Describe the kind.
pub fn sql_job() -> SqlJob {
    let schema = Schema::v0()
        .with_description("A SQL statement run on a cron schedule")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("sql_job_id", Attribute::computed_string())
        .with_attribute("name", Attribute::required_string())
        .with_attribute("description", Attribute::optional_string())
        .with_attribute("query", Attribute::required_string())
        .with_attribute("cluster_id", Attribute::required_string())
        .with_attribute("role_id", Attribute::required_string())
        .with_attribute(
            "cron_expression",
            Attribute::required_string().with_description("Five-field cron, e.g. 0 3 * * *"),
        )
        .with_attribute(
            "timezone",
            Attribute::optional_computed_string().with_description("IANA zone; server default UTC"),
        )
        .with_attribute("created_on", Attribute::computed_string())
        .with_attribute("next_execution", Attribute::computed_string());
    SqlJob(KindDefinition::new(
        "sql_job",
        ApiPath::new("/sqlJob"),
        Identity::mirrored("sqlJobId", "sql_job_id"),
        schema,
    ))
}

impl ResourceKind for SqlJob {
    fn definition(&self) -> &KindDefinition {
        &self.0
    }

    fn validate(&self, plan: &Record, diags: &mut Diagnostics) {
        if let Some(cron) = plan.get_str("cron_expression") {
            let fields = cron.split_whitespace().count();
            if fields != 5 {
                diags.error(
                    "cron_expression",
                    format!("cron_expression must have 5 fields, found {fields}"),
                );
            }
        }
    }
}
