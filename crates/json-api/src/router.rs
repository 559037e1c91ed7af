//! App Router

use salvo::Router;

use crate::{
    carts, healthcheck, identity, observability::request_logging, operator, orders, promotions,
};

pub fn app_router() -> Router {
    Router::new()
        .hoop(request_logging)
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(shopper_router())
        .push(operator_router())
}

/// Routes acting on behalf of a shopper identified by user id or session token.
fn shopper_router() -> Router {
    Router::new()
        .hoop(identity::middleware::handler)
        .push(
            Router::with_path("cart")
                .get(carts::handlers::get::handler)
                .delete(carts::handlers::clear::handler)
                .push(
                    Router::with_path("items")
                        .post(carts::items::handlers::create::handler)
                        .push(
                            Router::with_path("{product}")
                                .put(carts::items::handlers::update::handler)
                                .delete(carts::items::handlers::delete::handler),
                        ),
                )
                .push(
                    Router::with_path("promotion")
                        .post(carts::promotion::handlers::apply::handler)
                        .delete(carts::promotion::handlers::remove::handler),
                ),
        )
        .push(Router::with_path("checkout").post(orders::handlers::create::handler))
        .push(
            Router::with_path("orders")
                .get(orders::handlers::index::handler)
                .push(Router::with_path("{order}").get(orders::handlers::get::handler)),
        )
}

fn operator_router() -> Router {
    Router::new()
        .hoop(operator::middleware::handler)
        .push(
            Router::with_path("admin/orders")
                .get(orders::handlers::list_all::handler)
                .push(
                    Router::with_path("{number}").get(orders::handlers::find_by_number::handler),
                ),
        )
        .push(
            Router::with_path("orders/{order}")
                .push(Router::with_path("status").put(orders::handlers::update_status::handler))
                .push(
                    Router::with_path("payment-status")
                        .put(orders::handlers::update_payment_status::handler),
                ),
        )
        .push(
            Router::with_path("promotions")
                .get(promotions::handlers::index::handler)
                .post(promotions::handlers::create::handler)
                .push(
                    Router::with_path("{code}")
                        .get(promotions::handlers::get::handler)
                        .put(promotions::handlers::update::handler)
                        .delete(promotions::handlers::delete::handler),
                ),
        )
}
