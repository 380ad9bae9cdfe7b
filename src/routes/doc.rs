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
        admins::{AdminList, CreateAdminRequest, UpdateAdminRequest, UserList},
        auth::{
            AuthIdentity, AuthResponse, ChangePasswordRequest, ForgotPasswordRequest,
            LoginRequest, RegisterRequest, ResetPasswordRequest, VerifyResponse,
        },
        cart::{AddToCartRequest, CartLine, CartList, UpdateCartItemRequest},
        messages::{CreateMessageRequest, MessageList},
        orders::{
            CheckoutResponse, CreateOrderRequest, OrderItemRequest, OrderList, OrderWithItems,
            OrdererRequest, UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        tags::{CreateTagRequest, TagList, TagSaleRequest},
    },
    models::{
        Address, Admin, ColorVariant, Message, Order, OrderItem, OrderStatus, PaymentMethod,
        Product, Role, SizeStock, Tag, TagKind, User,
    },
    response::{ApiResponse, Meta},
    routes::{admins, auth, cart, health, messages, orders, params, products, tags, users},
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
        auth::verify,
        auth::forgot_password,
        auth::resend_otp,
        auth::reset_password,
        auth::change_password,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        tags::create_tag,
        tags::list_categories,
        tags::list_collections,
        tags::get_tag,
        tags::delete_tag,
        tags::add_sale,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        orders::create_order,
        orders::list_all_orders,
        orders::my_orders,
        orders::get_order,
        orders::update_order_status,
        admins::list_admins,
        admins::create_admin,
        admins::update_admin,
        admins::delete_admin,
        users::list_users,
        users::delete_user,
        messages::create_message,
        messages::list_messages
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            TagKind,
            PaymentMethod,
            Address,
            SizeStock,
            ColorVariant,
            User,
            Admin,
            Tag,
            Product,
            Order,
            OrderItem,
            Message,
            RegisterRequest,
            LoginRequest,
            AuthIdentity,
            AuthResponse,
            VerifyResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            ChangePasswordRequest,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateTagRequest,
            TagSaleRequest,
            TagList,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartLine,
            CartList,
            OrderItemRequest,
            OrdererRequest,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            CheckoutResponse,
            OrderWithItems,
            OrderList,
            CreateAdminRequest,
            UpdateAdminRequest,
            AdminList,
            UserList,
            CreateMessageRequest,
            MessageList,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<CartList>,
            ApiResponse<TagList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication and password reset"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Tags", description = "Category and collection tags"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and order management"),
        (name = "Admins", description = "Admin account management"),
        (name = "Users", description = "Customer management"),
        (name = "Messages", description = "Contact form"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
