//! Default route table shipped with the gateway.
//!
//! French-named and unprefixed paths are kept for the existing frontend and
//! rewritten onto the paths the backend services actually expose.

use crate::gateway::router::RouteRule;
use crate::gateway::services::ServiceKind::{self, Auth, Crm, Documents, Library, Tenant};

/// Prefix rules: (inbound prefix, service, rewritten prefix)
const PREFIX_ROUTES: &[(&str, ServiceKind, Option<&str>)] = &[
    // Legacy French routes
    ("/api/devis", Documents, Some("/api/quotes")),
    ("/api/factures", Documents, Some("/api/invoices")),
    ("/api/tiers", Crm, None),
    ("/api/opportunites", Crm, None),
    // Core services
    ("/api/auth", Auth, None),
    ("/api/tenants", Tenant, None),
    ("/api/quotes", Documents, None),
    ("/api/invoices", Documents, None),
    // CRM
    ("/api/crm", Crm, None),
    ("/api/opportunities", Crm, None),
    ("/api/clients", Crm, Some("/api/tiers")),
    ("/api/prospects", Crm, Some("/api/tiers")),
    ("/api/fournisseurs", Crm, Some("/api/tiers")),
    ("/tiers", Crm, Some("/api/crm/tiers")),
    ("/clients", Crm, Some("/api/crm/tiers")),
    ("/prospects", Crm, Some("/api/crm/tiers")),
    ("/fournisseurs", Crm, Some("/api/crm/tiers")),
    ("/opportunities", Crm, Some("/api/crm/opportunities")),
    // Documents
    ("/api/projects", Documents, None),
    ("/api/quote-items", Documents, None),
    ("/api/invoice-items", Documents, None),
    ("/quotes", Documents, Some("/api/quotes")),
    ("/invoices", Documents, Some("/api/invoices")),
    ("/quote-items", Documents, Some("/api/quote-items")),
    // Auth and tenants without the /api prefix
    ("/api/auth/tenants", Tenant, Some("/api/tenants")),
    ("/auth/tenants", Tenant, Some("/api/tenants")),
    ("/auth", Auth, Some("/api/auth")),
    ("/tenants", Tenant, Some("/api/tenants")),
    ("/api/document_appearance", Tenant, None),
    ("/document_appearance", Tenant, Some("/api/document_appearance")),
    // Library
    ("/api/library/categories", Library, Some("/api/categories")),
    ("/api/library/fournitures", Library, Some("/api/fournitures")),
    ("/api/library/main-oeuvre", Library, Some("/api/main-oeuvre")),
    ("/api/library/ouvrages", Library, Some("/api/ouvrages")),
    ("/api/library/ingredients", Library, Some("/api/ingredients")),
    ("/api/library/search", Library, Some("/api/search")),
    ("/api/library/composite", Library, Some("/api/composite")),
    ("/api/categories", Library, None),
    ("/api/fournitures", Library, None),
    ("/api/main-oeuvre", Library, None),
    ("/api/ouvrages", Library, None),
    ("/api/ingredients", Library, None),
    ("/categories", Library, Some("/api/categories")),
    ("/fournitures", Library, Some("/api/fournitures")),
    ("/main-oeuvre", Library, Some("/api/main-oeuvre")),
    ("/ouvrages", Library, Some("/api/ouvrages")),
    ("/ingredients", Library, Some("/api/ingredients")),
    ("/library/composite", Library, Some("/api/composite")),
];

/// Exact rules: (inbound path, service, target path).
///
/// Each entry also rewrites the paths below it, as a prefix rule would.
const EXACT_ROUTES: &[(&str, ServiceKind, &str)] = &[
    ("/api/quotes/next-number/", Documents, "/api/quotes/next_number/"),
    ("/vat-rates/", Documents, "/api/quotes/vat-rates/"),
    ("/api/quotes/payment-terms/", Documents, "/api/payment-terms/"),
    ("/payment-terms/", Documents, "/api/payment-terms/"),
    ("/api/tenant/vat_rates/", Tenant, "/api/vat_rates/"),
    ("/api/tenants/vat_rates/", Tenant, "/api/vat_rates/"),
    ("/tenants/vat_rates/", Tenant, "/api/vat_rates/"),
    ("/api/tenants/payment_terms/", Tenant, "/api/payment_terms/"),
    ("/tenants/payment_terms/", Tenant, "/api/payment_terms/"),
    ("/library/search/", Library, "/api/search/"),
];

/// Template rules: (inbound pattern, service, target pattern)
const TEMPLATE_ROUTES: &[(&str, ServiceKind, &str)] = &[
    ("/api/tiers/{id}/restaurer/", Crm, "/api/tiers/{id}/restore/"),
    ("/tiers/{id}/restaurer/", Crm, "/api/crm/tiers/{id}/restore/"),
    (
        "/auth/tenants/{tenant_id}/",
        Tenant,
        "/api/tenants/current_tenant_info/",
    ),
];

/// The full default rule set
pub fn default_rules() -> Vec<RouteRule> {
    let exact = EXACT_ROUTES
        .iter()
        .map(|(path, service, target)| RouteRule::exact(path, *service, target));
    let templates = TEMPLATE_ROUTES
        .iter()
        .map(|(pattern, service, target)| RouteRule::template(pattern, *service, target));
    let nested = EXACT_ROUTES
        .iter()
        .map(|(path, service, target)| RouteRule::prefix(path, *service, Some(*target)));
    let prefixes = PREFIX_ROUTES
        .iter()
        .map(|(prefix, service, rewritten)| RouteRule::prefix(prefix, *service, *rewritten));

    exact
        .chain(templates)
        .chain(nested)
        .chain(prefixes)
        .collect()
}
