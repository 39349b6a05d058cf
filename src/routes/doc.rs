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
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{CartView, ChangeQtyRequest},
        catalog::{CategoryDetail, ProductList, SidebarList},
        customers::UpdateProfileRequest,
        orders::{CheckoutRequest, OrderList, OrderWithLines, UpdateOrderStatusRequest},
        products::{
            CreateNotebookRequest, CreateSmartphoneRequest, ProductFields, UpdateProductRequest,
        },
    },
    entity::orders::{BuyingType, OrderStatus},
    image_policy::ImageUpload,
    models::{
        Cart, CartLine, Category, Customer, NotebookSpecs, Order, ProductDetail, ProductRef,
        ProductSpecs, SidebarCategory, SmartphoneSpecs, User,
    },
    product_kind::ProductKind,
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, categories, customers, health, orders, params, products},
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
        auth::register,
        auth::login,
        categories::list_categories,
        categories::category_detail,
        products::latest_products,
        products::list_products,
        products::get_product,
        cart::view_cart,
        cart::add_to_cart,
        cart::change_qty,
        cart::remove_from_cart,
        orders::checkout,
        orders::list_orders,
        orders::get_order,
        customers::get_profile,
        customers::update_profile,
        admin::create_notebook,
        admin::create_smartphone,
        admin::update_product,
        admin::delete_product,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status
    ),
    components(
        schemas(
            User,
            Category,
            SidebarCategory,
            ProductKind,
            ProductRef,
            ProductSpecs,
            NotebookSpecs,
            SmartphoneSpecs,
            ProductDetail,
            Customer,
            Cart,
            CartLine,
            Order,
            OrderStatus,
            BuyingType,
            ImageUpload,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ChangeQtyRequest,
            CartView,
            CheckoutRequest,
            UpdateOrderStatusRequest,
            UpdateProfileRequest,
            ProductFields,
            CreateNotebookRequest,
            CreateSmartphoneRequest,
            UpdateProductRequest,
            ProductList,
            SidebarList,
            CategoryDetail,
            OrderList,
            OrderWithLines,
            params::Pagination,
            params::ProductQuery,
            params::LatestQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<CartView>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<OrderWithLines>,
            ApiResponse<OrderList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Categories", description = "Category navigation"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Cart endpoints, for users and anonymous visitors"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Customers", description = "Customer profile"),
        (name = "Admin", description = "Catalog and order administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
