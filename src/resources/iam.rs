//! Cross-account IAM roles.
//!
//! These objects are keyed by the role ARN rather than a server-assigned
//! identifier, and cannot be edited once registered.

use crate::kind::{Identity, KindDefinition};
use crate::resources::BasicKind;
use crate::schema::{Attribute, Schema};
use crate::transport::ApiPath;

/// The `cross_account_iam_role` kind.
pub fn cross_account_iam_role() -> BasicKind {
    let schema = Schema::v0()
        .with_description("An AWS IAM role Galaxy may assume in another account")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "aws_iam_arn",
            Attribute::required_string()
                .with_force_new()
                .with_description("arn:aws:iam::<account>:role/<name>"),
        )
        .with_attribute("alias_name", Attribute::required_string().with_force_new());
    BasicKind::new(KindDefinition::new(
        "cross_account_iam_role",
        ApiPath::new("/crossAccountIamRole"),
        Identity::mirrored("awsIamArn", "aws_iam_arn"),
        schema,
    ))
}
