use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse},
        cart::{AddToCartRequest, AddToCartResponse, CartView, UpdateCartQuantityRequest},
        checkout::{CheckoutRequest, CheckoutResponse},
        products::{CreateProductRequest, ProductList, UpdateProductRequest, UpdateStockRequest},
        reports::SaleList,
        users::{CreateUserRequest, UserList},
    },
    models::{CartLine, Product, Role, Sale, SaleItem, User},
    navigation::Page,
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, checkout, health, pages, params, products},
    stores::AddOutcome,
    workflow::{FrequencyRow, ReportKind, SalesReport},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::logout,
        auth::me,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::set_stock,
        cart::cart_view,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        checkout::checkout,
        checkout::receipt,
        admin::list_users,
        admin::create_user,
        admin::list_sales,
        admin::list_low_stock,
        admin::report_summary,
        admin::report_document,
        pages::login_page,
        pages::catalog_page,
        pages::cart_page,
        pages::checkout_page,
        pages::admin_page
    ),
    components(
        schemas(
            User,
            Role,
            Product,
            CartLine,
            Sale,
            SaleItem,
            Page,
            AddOutcome,
            ReportKind,
            FrequencyRow,
            SalesReport,
            LoginRequest,
            LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            UpdateStockRequest,
            ProductList,
            AddToCartRequest,
            AddToCartResponse,
            UpdateCartQuantityRequest,
            CartView,
            CheckoutRequest,
            CheckoutResponse,
            CreateUserRequest,
            UserList,
            SaleList,
            pages::PageView,
            pages::AdminSummary,
            params::SearchQuery,
            params::LowStockQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<SalesReport>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Login and session endpoints"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Cart of the current session"),
        (name = "Checkout", description = "Checkout and receipts"),
        (name = "Admin", description = "Users, sales, inventory and reports"),
        (name = "Pages", description = "Role-gated screens"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
