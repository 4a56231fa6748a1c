//! Named `minijinja` templates with embedded defaults.
//!
//! Every template has a built-in source compiled into the binary. When an
//! override directory is configured, a file at the same relative path
//! replaces the built-in one.

use crate::error::{Result, RmaError};
use crate::state::{RmaRequest, SiteMetadata};
use minijinja::Environment;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Admin notice sent on creation.
pub const ADMIN_CREATION_TEMPLATE: &str = "emails/rma_request_admin_msg.txt";

/// Customer notice sent on creation.
pub const CUSTOMER_CREATION_TEMPLATE: &str = "emails/rma_generation_customer_msg.txt";

/// Customer instructions sent on approval.
pub const CUSTOMER_INSTRUCTIONS_TEMPLATE: &str = "emails/rma_instruction_msg.txt";

/// Built-in email templates.
pub const EMAIL_TEMPLATES: &[(&str, &str)] = &[
    (
        ADMIN_CREATION_TEMPLATE,
        include_str!("../../templates/emails/rma_request_admin_msg.txt"),
    ),
    (
        CUSTOMER_CREATION_TEMPLATE,
        include_str!("../../templates/emails/rma_generation_customer_msg.txt"),
    ),
    (
        CUSTOMER_INSTRUCTIONS_TEMPLATE,
        include_str!("../../templates/emails/rma_instruction_msg.txt"),
    ),
];

/// Template renderer.
///
/// Cheap to clone; clones share the compiled templates.
#[derive(Clone)]
pub struct TemplateRenderer {
    env: Arc<Environment<'static>>,
}

impl TemplateRenderer {
    /// Build a renderer from built-in sources and an optional override directory.
    ///
    /// # Errors
    ///
    /// Returns error if an override file cannot be read or any template
    /// fails to compile.
    pub fn new(builtin: &[(&'static str, &'static str)], overrides: Option<&Path>) -> Result<Self> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);

        for &(name, source) in builtin {
            match overrides.map(|dir| dir.join(name)).filter(|path| path.is_file()) {
                Some(path) => {
                    let custom = std::fs::read_to_string(&path).map_err(|e| {
                        RmaError::TemplateError(format!("Cannot read {}: {e}", path.display()))
                    })?;
                    tracing::info!(template = name, path = %path.display(), "Using template override");
                    env.add_template_owned(name, custom)?;
                }
                None => env.add_template(name, source)?,
            }
        }

        Ok(Self { env: Arc::new(env) })
    }

    /// Renderer for the email templates.
    ///
    /// # Errors
    ///
    /// Same as [`TemplateRenderer::new`].
    pub fn emails(overrides: Option<&Path>) -> Result<Self> {
        Self::new(EMAIL_TEMPLATES, overrides)
    }

    /// Render a template by name.
    ///
    /// # Errors
    ///
    /// Returns error if the template is unknown or rendering fails.
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String> {
        Ok(self.env.get_template(name)?.render(context)?)
    }
}

/// Variables available to the email templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationContext {
    /// RMA number.
    pub rma_number: String,
    /// Customer name.
    pub customer_name: String,
    /// Customer email.
    pub customer_email: String,
    /// Customer phone, empty when not given.
    pub customer_phone: String,
    /// Product SKU.
    pub product_sku: String,
    /// Reason for return.
    pub reason_for_return: String,
    /// Submission time, formatted for humans.
    pub submitted_date: String,
    /// Site name.
    pub site_name: String,
    /// Return address; set for the instructions email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_address: Option<String>,
    /// Instructions with the RMA number filled in; set for the instructions email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_instruction: Option<String>,
}

impl NotificationContext {
    /// Context for the creation notices.
    #[must_use]
    pub fn for_creation(request: &RmaRequest, site: &SiteMetadata) -> Self {
        Self {
            rma_number: request.rma_number.to_string(),
            customer_name: request.customer_name.clone(),
            customer_email: request.email.clone(),
            customer_phone: request.phone.clone().unwrap_or_default(),
            product_sku: request.product_sku.clone(),
            reason_for_return: request.reason_for_return.clone(),
            submitted_date: request.created_at.format("%B %-d, %Y, %-I:%M %p").to_string(),
            site_name: site.name.clone(),
            return_address: None,
            admin_instruction: None,
        }
    }

    /// Context for the return instructions.
    #[must_use]
    pub fn for_instructions(request: &RmaRequest, site: &SiteMetadata) -> Self {
        Self {
            return_address: Some(site.return_address.clone()),
            admin_instruction: Some(request.rendered_instructions()),
            ..Self::for_creation(request, site)
        }
    }
}
