//! HTML pages for the customer RMA form.

use rma_desk_core::Result;
use rma_desk_core::notifications::templates::TemplateRenderer;
use rma_desk_core::state::SiteMetadata;
use rma_desk_core::validation::{RmaFormInput, ValidationErrors, limits};
use serde::Serialize;
use std::path::Path;

/// Full page: layout plus the empty form.
pub const REQUEST_PAGE: &str = "rma/rma_request.html";

/// Form fragment, re-rendered with errors after a rejected POST.
pub const FORM_BLOCK: &str = "rma/rma_form_block.html";

/// Fragment shown after a successful POST.
pub const SUCCESS_BLOCK: &str = "rma/rma_form_block_with_success_message.html";

/// Built-in page templates.
pub const PAGE_TEMPLATES: &[(&str, &str)] = &[
    (REQUEST_PAGE, include_str!("../templates/rma/rma_request.html")),
    (FORM_BLOCK, include_str!("../templates/rma/rma_form_block.html")),
    (
        SUCCESS_BLOCK,
        include_str!("../templates/rma/rma_form_block_with_success_message.html"),
    ),
];

/// Build the page renderer, honoring overrides under `templates_dir`.
///
/// # Errors
///
/// Returns error if a template cannot be read or compiled.
pub fn page_renderer(templates_dir: Option<&Path>) -> Result<TemplateRenderer> {
    TemplateRenderer::new(PAGE_TEMPLATES, templates_dir)
}

/// One input of the RMA form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormField {
    /// Form field name.
    pub name: &'static str,
    /// Visible label.
    pub label: &'static str,
    /// Placeholder text.
    pub placeholder: &'static str,
    /// `type` attribute, or `textarea`.
    pub widget: &'static str,
    /// Browser-side `required`.
    pub required: bool,
    /// Browser-side `maxlength`, 0 for none.
    pub max_length: usize,
    /// `autocomplete` hint.
    pub autocomplete: &'static str,
}

/// Fields in display order.
pub const FORM_FIELDS: &[FormField] = &[
    FormField {
        name: "customer_name",
        label: "Customer Name",
        placeholder: "Customer name included with the order",
        widget: "text",
        required: true,
        max_length: limits::CUSTOMER_NAME,
        autocomplete: "name",
    },
    FormField {
        name: "email",
        label: "Order Email",
        placeholder: "Email address included with the order",
        widget: "email",
        required: true,
        max_length: limits::EMAIL,
        autocomplete: "email",
    },
    FormField {
        name: "phone",
        label: "Order Phone Number",
        placeholder: "Phone number included with the order",
        widget: "text",
        required: false,
        max_length: limits::PHONE,
        autocomplete: "tel",
    },
    FormField {
        name: "order_ref",
        label: "Order Reference",
        placeholder: "Order reference number",
        widget: "text",
        required: true,
        max_length: limits::ORDER_REF,
        autocomplete: "off",
    },
    FormField {
        name: "product_sku",
        label: "Product SKU",
        placeholder: "Product SKU",
        widget: "text",
        required: true,
        max_length: limits::PRODUCT_SKU,
        autocomplete: "off",
    },
    FormField {
        name: "reason_for_return",
        label: "Reason for return",
        placeholder: "Reason for return",
        widget: "textarea",
        required: true,
        max_length: 0,
        autocomplete: "off",
    },
];

/// Template context shared by the three RMA templates.
#[derive(Debug, Clone, Serialize)]
pub struct RmaPageContext {
    /// Site metadata with the RMA page title and description.
    pub site_data: SiteMetadata,
    /// Field definitions.
    pub fields: &'static [FormField],
    /// Values to echo back into the inputs.
    pub form: RmaFormInput,
    /// Errors from the last POST.
    pub errors: ValidationErrors,
    /// Identifier of the request just created.
    pub rma_number: Option<String>,
}

impl RmaPageContext {
    /// Empty form.
    #[must_use]
    pub fn new(site_data: SiteMetadata) -> Self {
        Self {
            site_data,
            fields: FORM_FIELDS,
            form: RmaFormInput::default(),
            errors: ValidationErrors::default(),
            rma_number: None,
        }
    }

    /// Form re-displayed with the submitted values and their errors.
    #[must_use]
    pub fn rejected(mut self, form: RmaFormInput, errors: ValidationErrors) -> Self {
        self.form = form;
        self.errors = errors;
        self
    }

    /// Success fragment for a created request.
    #[must_use]
    pub fn created(mut self, rma_number: String) -> Self {
        self.rma_number = Some(rma_number);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn site() -> SiteMetadata {
        let mut site = SiteMetadata::with_defaults(1);
        site.name = "ED Systems".to_string();
        site.title = "RMA request".to_string();
        site
    }

    #[test]
    fn test_full_page_contains_form() {
        let pages = page_renderer(None).unwrap();
        let html = pages.render(REQUEST_PAGE, &RmaPageContext::new(site())).unwrap();

        assert!(html.contains("<title>RMA request | ED Systems</title>"));
        for field in FORM_FIELDS {
            assert!(html.contains(&format!("name=\"{}\"", field.name)), "{}", field.name);
        }
    }

    #[test]
    fn test_rejected_form_echoes_values_escaped() {
        let pages = page_renderer(None).unwrap();
        let mut errors = ValidationErrors::default();
        errors.add("email", "Enter a valid email address.");
        errors.add_non_field("Something is off.");
        let form = RmaFormInput {
            customer_name: "<Ada>".to_string(),
            email: "nope".to_string(),
            ..RmaFormInput::default()
        };

        let html = pages
            .render(FORM_BLOCK, &RmaPageContext::new(site()).rejected(form, errors))
            .unwrap();

        assert!(html.contains("Enter a valid email address."));
        assert!(html.contains("Something is off."));
        assert!(html.contains("value=\"nope\""));
        assert!(html.contains("&lt;Ada&gt;"));
        assert!(!html.contains("<Ada>"));
    }

    #[test]
    fn test_success_block_shows_number() {
        let pages = page_renderer(None).unwrap();
        let html = pages
            .render(
                SUCCESS_BLOCK,
                &RmaPageContext::new(site()).created("RMA-00042".to_string()),
            )
            .unwrap();

        assert!(html.contains("RMA-00042"));
    }
}
