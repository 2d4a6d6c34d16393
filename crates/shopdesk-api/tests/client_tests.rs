// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use serde_json::json;
use shopdesk_api::{ApiError, Client, ProductDeletion, user_message};
use shopdesk_app::forms::{
    CustomerFormInput, LoginInput, ProductFormInput, RepairTicketFormInput, WarrantyLookupInput,
    customer_ref,
};
use shopdesk_app::query::{CustomerFilter, ListQuery, ProductFilter, QueryCommand, TicketFilter};
use shopdesk_app::{
    BrandId, CustomerId, CustomerTier, ProductModelId, RepairTicketId, SortDirection, TicketStatus,
};
use shopdesk_testkit::{
    MockResponse, MockServer, ShopFaker, error_body, spring_page, wrapped,
};
use std::time::Duration;
use time::macros::date;

fn client_for(server: &MockServer) -> Result<Client> {
    Client::new(server.base_url(), Duration::from_secs(2))
}

#[test]
fn unreachable_backend_error_names_the_fix() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(200))?;
    let query = ListQuery::<CustomerFilter>::new("name", 10);

    let error = client
        .list_customers(&query)
        .expect_err("nothing listens on port 1");
    let message = user_message(&error);
    assert!(message.contains("list customers"));
    assert!(message.contains("start the backend"));
    Ok(())
}

#[test]
fn customer_list_sends_zero_based_page_and_sort() -> Result<()> {
    let mut faker = ShopFaker::new(3);
    let page = spring_page(faker.customers(2), 1, 5, 7);
    let server = MockServer::start(vec![MockResponse::ok(&page)])?;
    let client = client_for(&server)?.with_token(Some("abc123".to_owned()));

    let mut query = ListQuery::<CustomerFilter>::new("createdAt", 5);
    query.page = 2;
    query.direction = SortDirection::Desc;
    let envelope = client.list_customers(&query)?;

    assert_eq!(envelope.items.len(), 2);
    assert_eq!(envelope.ui_page(), 2);
    assert_eq!(envelope.total_pages, 2);
    assert_eq!(envelope.total_items, 7);

    let requests = server.finish()?;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "GET");
    assert_eq!(request.path(), "/api/customers");
    assert_eq!(request.query("page").as_deref(), Some("1"));
    assert_eq!(request.query("size").as_deref(), Some("5"));
    assert_eq!(request.query("sort").as_deref(), Some("createdAt,desc"));
    assert_eq!(request.authorization.as_deref(), Some("Bearer abc123"));
    Ok(())
}

#[test]
fn customer_keyword_uses_quick_search_and_tier_filters_rows() -> Result<()> {
    let page = spring_page(
        vec![
            json!({"id": 1, "fullName": "Trần Văn An", "tier": "VIP"}),
            json!({"id": 2, "fullName": "Trần Thị Bích", "tier": "regular"}),
        ],
        0,
        10,
        2,
    );
    let server = MockServer::start(vec![MockResponse::ok(&wrapped(page))])?;
    let client = client_for(&server)?;

    let mut query = ListQuery::<CustomerFilter>::new("name", 10);
    query.dispatch(QueryCommand::Search("  Trần ".to_owned()), 1);
    query.dispatch(
        QueryCommand::Filter(CustomerFilter {
            tier: Some(CustomerTier::Vip),
        }),
        1,
    );
    let envelope = client.list_customers(&query)?;

    assert_eq!(envelope.items.len(), 1);
    assert_eq!(envelope.items[0].name, "Trần Văn An");
    assert_eq!(envelope.total_items, 2);

    let requests = server.finish()?;
    assert_eq!(requests[0].path(), "/api/customers/quick-search");
    assert_eq!(requests[0].query("keyword").as_deref(), Some("Trần"));
    assert_eq!(requests[0].query("sort").as_deref(), Some("fullName,asc"));
    assert!(requests[0].authorization.is_none());
    Ok(())
}

#[test]
fn customer_create_sends_normalized_payload() -> Result<()> {
    let created = wrapped(json!({"id": 41, "fullName": "Lê Minh", "phone": "0901234567"}));
    let server = MockServer::start(vec![MockResponse::json(201, &created)])?;
    let client = client_for(&server)?;

    let form = CustomerFormInput {
        full_name: "  Lê Minh ".to_owned(),
        phone: "0901234567".to_owned(),
        birthday: "2001-04-09T00:00:00".to_owned(),
        ..CustomerFormInput::default()
    };
    form.validate()?;
    let row = client.create_customer(&form.payload())?;
    assert_eq!(row.id, Some(CustomerId::new(41)));

    let requests = server.finish()?;
    assert_eq!(requests[0].method, "POST");
    let body = requests[0].json_body()?;
    assert_eq!(body["fullName"], "Lê Minh");
    assert_eq!(body["birthDate"], "2001-04-09");
    assert!(body["email"].is_null());
    Ok(())
}

#[test]
fn customer_activation_endpoints() -> Result<()> {
    let server = MockServer::start(vec![MockResponse::empty(204), MockResponse::empty(200)])?;
    let client = client_for(&server)?;

    client.deactivate_customer(CustomerId::new(5))?;
    client.activate_customer(CustomerId::new(5))?;

    let requests = server.finish()?;
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].path(), "/api/customers/5");
    assert_eq!(requests[1].method, "PATCH");
    assert_eq!(requests[1].path(), "/api/customers/5/activate");
    Ok(())
}

#[test]
fn bulk_deactivate_reports_partial_failure() -> Result<()> {
    let server = MockServer::start_with(3, |request| {
        if request.path().ends_with("/2") {
            MockResponse::json(409, &error_body(409, "Customer has open orders"))
        } else {
            MockResponse::empty(204)
        }
    })?;
    let client = client_for(&server)?;

    let ids = [CustomerId::new(1), CustomerId::new(2), CustomerId::new(3)];
    let outcome = client.bulk_deactivate_customers(&ids);

    assert!(!outcome.is_complete());
    let mut succeeded = outcome.succeeded.clone();
    succeeded.sort();
    assert_eq!(succeeded, vec![CustomerId::new(1), CustomerId::new(3)]);
    assert_eq!(
        outcome.failed,
        vec![(CustomerId::new(2), "Customer has open orders".to_owned())]
    );

    let requests = server.finish()?;
    assert!(requests.iter().all(|request| request.method == "DELETE"));
    Ok(())
}

#[test]
fn customer_statistics_decode_from_wrapper() -> Result<()> {
    let stats = wrapped(json!({
        "totalActiveCustomers": 120,
        "vipTierCount": 8,
        "newCustomersThisMonth": 14,
    }));
    let server = MockServer::start(vec![MockResponse::ok(&stats)])?;
    let client = client_for(&server)?;

    let statistics = client.customer_statistics()?;
    assert_eq!(statistics.total_active_customers, Some(120));
    assert_eq!(statistics.vip_tier_count, Some(8));
    assert_eq!(statistics.potential_tier_count, None);

    let requests = server.finish()?;
    assert_eq!(requests[0].path(), "/api/customers/statistics");
    Ok(())
}

#[test]
fn body_that_ends_early_is_an_error_not_an_empty_page() -> Result<()> {
    let page = spring_page(ShopFaker::new(5).customers(3), 0, 10, 3).to_string();
    let server = MockServer::start(vec![MockResponse::cut_short(200, &page[..page.len() / 2])])?;
    let client = client_for(&server)?;

    let error = client
        .list_customers(&ListQuery::<CustomerFilter>::new("name", 10))
        .expect_err("a truncated body must not decode");
    assert!(matches!(
        error.downcast_ref::<ApiError>(),
        Some(ApiError::Decode { .. })
    ));
    assert!(user_message(&error).contains("list customers"));

    server.finish()?;
    Ok(())
}

#[test]
fn product_category_is_one_encoded_segment_and_keyword_is_local() -> Result<()> {
    let rows = json!([
        {"id": 1, "brandId": 2, "brandName": "Samsung", "name": "Galaxy Watch 6", "category": "SMART WATCH", "isActive": true},
        {"id": 2, "brandId": 1, "brandName": "Apple", "name": "Watch Series 9", "category": "SMART WATCH", "isActive": true},
    ]);
    let server = MockServer::start(vec![MockResponse::ok(&rows)])?;
    let client = client_for(&server)?;

    let mut query = ListQuery::<ProductFilter>::new("name", 10);
    query.filter.category = Some("SMART WATCH".to_owned());
    query.keyword = "apple".to_owned();
    let envelope = client.list_products(&query)?;

    assert_eq!(envelope.items.len(), 1);
    assert_eq!(envelope.items[0].name, "Watch Series 9");
    assert_eq!(envelope.total_items, 1);
    assert_eq!(envelope.total_pages, 1);

    let requests = server.finish()?;
    assert_eq!(requests[0].url, "/api/product-models/category/SMART%20WATCH");
    Ok(())
}

#[test]
fn product_routes_follow_filter_priority() -> Result<()> {
    let server = MockServer::start(vec![
        MockResponse::ok(&json!([])),
        MockResponse::ok(&json!([])),
        MockResponse::ok(&spring_page(Vec::new(), 0, 20, 0)),
    ])?;
    let client = client_for(&server)?;

    let mut query = ListQuery::<ProductFilter>::new("category", 20);
    query.filter.active = Some(false);
    query.filter.brand_id = Some(BrandId::new(3));
    client.list_products(&query)?;

    query.filter.active = None;
    client.list_products(&query)?;

    query.filter = ProductFilter {
        category: Some("ALL".to_owned()),
        ..ProductFilter::default()
    };
    client.list_products(&query)?;

    let requests = server.finish()?;
    assert_eq!(requests[0].url, "/api/product-models/inactive");
    assert_eq!(requests[1].url, "/api/product-models/brand/3");
    assert_eq!(requests[2].path(), "/api/product-models");
    assert_eq!(requests[2].query("sortBy").as_deref(), Some("category"));
    assert_eq!(requests[2].query("sortDir").as_deref(), Some("asc"));
    assert_eq!(requests[2].query("page").as_deref(), Some("0"));
    Ok(())
}

#[test]
fn inactive_product_is_created_then_deactivated() -> Result<()> {
    let server = MockServer::start(vec![
        MockResponse::json(201, &json!({"id": 77, "name": "Pixel 9", "isActive": true})),
        MockResponse::empty(200),
    ])?;
    let client = client_for(&server)?;

    let form = ProductFormInput {
        brand_id: BrandId::new(4),
        name: "Pixel 9".to_owned(),
        is_active: false,
        ..ProductFormInput::default()
    };
    let saved = client.create_product(&form)?;
    assert!(!saved.product.is_active);
    assert_eq!(saved.activation_changed, Some(false));

    let requests = server.finish()?;
    assert_eq!(requests[0].method, "POST");
    let body = requests[0].json_body()?;
    assert_eq!(body["brandId"], 4);
    assert_eq!(body["category"], "PHONE");
    assert!(body.get("isActive").is_none());
    assert_eq!(requests[1].method, "PUT");
    assert_eq!(requests[1].path(), "/api/product-models/77/deactivate");
    Ok(())
}

#[test]
fn update_product_flips_activation_only_when_changed() -> Result<()> {
    let server = MockServer::start(vec![
        MockResponse::ok(&json!({"name": "Galaxy A55", "isActive": false})),
        MockResponse::empty(200),
        MockResponse::ok(&json!({"id": 9, "name": "Galaxy A55", "isActive": true})),
    ])?;
    let client = client_for(&server)?;

    let id = ProductModelId::new(9);
    let form = ProductFormInput {
        brand_id: BrandId::new(2),
        name: "Galaxy A55".to_owned(),
        ..ProductFormInput::default()
    };
    let saved = client.update_product(id, &form, false)?;
    assert_eq!(saved.product.id, Some(id));
    assert_eq!(saved.activation_changed, Some(true));

    let unchanged = client.update_product(id, &form, true)?;
    assert_eq!(unchanged.activation_changed, None);

    let requests = server.finish()?;
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].path(), "/api/product-models/9/activate");
    assert_eq!(requests[2].method, "PUT");
    Ok(())
}

#[test]
fn delete_referenced_product_leaves_it_deactivated() -> Result<()> {
    let refusal = error_body(
        500,
        "update or delete on table \"product_model\" violates foreign key constraint on table \"sku\"",
    );
    let server = MockServer::start(vec![
        MockResponse::empty(200),
        MockResponse::json(500, &refusal),
    ])?;
    let client = client_for(&server)?;

    let outcome = client.delete_product(ProductModelId::new(12), true)?;
    assert_eq!(
        outcome,
        ProductDeletion::StillReferenced {
            deactivated_first: true
        }
    );

    let requests = server.finish()?;
    assert_eq!(requests[0].path(), "/api/product-models/12/deactivate");
    assert_eq!(requests[1].method, "DELETE");
    Ok(())
}

#[test]
fn delete_other_failure_is_an_error() -> Result<()> {
    let server = MockServer::start(vec![MockResponse::json(
        403,
        &json!({"error": {"message": "Forbidden"}}),
    )])?;
    let client = client_for(&server)?;

    let error = client
        .delete_product(ProductModelId::new(3), false)
        .expect_err("forbidden");
    assert_eq!(user_message(&error), "Forbidden");
    server.finish()?;
    Ok(())
}

#[test]
fn import_keeps_going_after_a_failed_row() -> Result<()> {
    let server = MockServer::start(vec![
        MockResponse::json(400, &error_body(400, "Brand not found")),
        MockResponse::json(201, &json!({"id": 5, "name": "iPhone 15"})),
    ])?;
    let client = client_for(&server)?;

    let rows = vec![
        (
            2,
            ProductFormInput {
                brand_id: BrandId::new(99),
                name: "Mystery".to_owned(),
                ..ProductFormInput::default()
            },
        ),
        (
            3,
            ProductFormInput {
                brand_id: BrandId::new(1),
                name: "iPhone 15".to_owned(),
                ..ProductFormInput::default()
            },
        ),
    ];
    let outcome = client.import_products(&rows);
    assert_eq!(outcome.succeeded, vec![3]);
    assert_eq!(outcome.failed, vec![(2, "Brand not found".to_owned())]);
    assert_eq!(server.finish()?.len(), 2);
    Ok(())
}

#[test]
fn ticket_list_sends_filters_and_reads_items_total() -> Result<()> {
    let mut faker = ShopFaker::new(11);
    let body = json!({"items": faker.tickets(3), "total": 23, "page": 1, "size": 10});
    let server = MockServer::start(vec![MockResponse::ok(&body)])?;
    let client = client_for(&server)?;

    let mut query = ListQuery::<TicketFilter>::new("createdAt", 10);
    query.page = 2;
    query.keyword = "RT2025".to_owned();
    query.filter = TicketFilter {
        status: Some(TicketStatus::InProgress),
        from: Some(date!(2025 - 06 - 01)),
        to: Some(date!(2025 - 06 - 30)),
    };
    let envelope = client.list_tickets(&query)?;

    assert_eq!(envelope.items.len(), 3);
    assert_eq!(envelope.total_pages, 3);
    assert_eq!(envelope.total_items, 23);

    let requests = server.finish()?;
    let request = &requests[0];
    assert_eq!(request.path(), "/api/repair-tickets");
    assert_eq!(request.query("q").as_deref(), Some("RT2025"));
    assert_eq!(request.query("status").as_deref(), Some("IN_PROGRESS"));
    assert_eq!(request.query("from").as_deref(), Some("2025-06-01"));
    assert_eq!(request.query("to").as_deref(), Some("2025-06-30"));
    assert_eq!(request.query("page").as_deref(), Some("1"));
    Ok(())
}

#[test]
fn ticket_create_and_status_change() -> Result<()> {
    let server = MockServer::start(vec![
        MockResponse::json(201, &json!({"id": 8, "code": "RT2025-008", "status": "RECEIVED"})),
        MockResponse::ok(&json!({"id": 8})),
        MockResponse::empty(204),
    ])?;
    let client = client_for(&server)?;

    let mut form = RepairTicketFormInput {
        customer: customer_ref(CustomerId::new(4)),
        initial_issue: "Cracked screen".to_owned(),
        parts_cost: 1_200_000.0,
        labor_cost: 150_000.0,
        due_date: "2025-06-10T17:00:00".to_owned(),
        ..RepairTicketFormInput::default()
    };
    form.device.model = "iPhone 13".to_owned();
    let created = client.create_ticket(&form)?;
    assert_eq!(created.id, Some(RepairTicketId::new(8)));

    let done = client.mark_ticket_done(RepairTicketId::new(8))?;
    assert_eq!(done.status(), Some(TicketStatus::Done));

    client.delete_ticket(RepairTicketId::new(8))?;

    let requests = server.finish()?;
    let body = requests[0].json_body()?;
    assert_eq!(body["totalCost"], 1_350_000.0);
    assert_eq!(body["dueDate"], "2025-06-10");
    assert_eq!(body["customer"]["id"], 4);
    assert_eq!(requests[1].method, "PATCH");
    assert_eq!(requests[1].path(), "/api/repair-tickets/8/status");
    assert_eq!(requests[1].json_body()?, json!({"status": "DONE"}));
    assert_eq!(requests[2].method, "DELETE");
    Ok(())
}

#[test]
fn technician_list_failure_is_empty() -> Result<()> {
    let server = MockServer::start(vec![
        MockResponse::ok(&wrapped(json!([{"id": 1, "fullName": "Phạm Quang"}]))),
        MockResponse::empty(500),
    ])?;
    let client = client_for(&server)?;

    let technicians = client.list_technicians();
    assert_eq!(technicians.len(), 1);
    assert_eq!(technicians[0].name, "Phạm Quang");
    assert!(client.list_technicians().is_empty());
    server.finish()?;
    Ok(())
}

#[test]
fn login_posts_credentials_and_keeps_token() -> Result<()> {
    let auth = wrapped(json!({
        "accessToken": "tok-1",
        "refreshToken": "ref-1",
        "role": "ADMIN",
    }));
    let server = MockServer::start(vec![
        MockResponse::ok(&auth),
        MockResponse::ok(&spring_page(Vec::new(), 0, 10, 0)),
    ])?;
    let mut client = client_for(&server)?;

    let input = LoginInput {
        email: "admin@shop.example".to_owned(),
        password: "secret1".to_owned(),
        ..LoginInput::default()
    };
    let session = client.login(&input)?;
    assert_eq!(session.access_token, "tok-1");
    assert_eq!(session.username.as_deref(), Some("admin@shop.example"));
    assert!(client.has_token());
    client.list_customers(&ListQuery::new("name", 10))?;

    let requests = server.finish()?;
    assert_eq!(requests[0].path(), "/api/auth/login");
    assert_eq!(
        requests[0].json_body()?,
        json!({"username": "admin@shop.example", "password": "secret1"})
    );
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer tok-1"));
    Ok(())
}

#[test]
fn login_rejection_surfaces_server_message() -> Result<()> {
    let server = MockServer::start(vec![MockResponse::json(
        401,
        &error_body(401, "Invalid username or password"),
    )])?;
    let mut client = client_for(&server)?;

    let input = LoginInput {
        username: "admin".to_owned(),
        password: "wrong-pass".to_owned(),
        ..LoginInput::default()
    };
    let error = client.login(&input).expect_err("rejected");
    assert_eq!(user_message(&error), "Invalid username or password");
    assert!(!client.has_token());
    server.finish()?;
    Ok(())
}

#[test]
fn warranty_lookup_sends_only_filled_fields() -> Result<()> {
    let found = wrapped(json!({
        "customer": {"name": "Nguyễn Văn A", "phone": "0901234567"},
        "device": {"productName": "iPhone 15", "imei": "356789012345678"},
        "warranty": {"startDate": "2025-01-01", "endDate": "2026-01-01", "status": "ACTIVE"},
    }));
    let server = MockServer::start(vec![MockResponse::ok(&found), MockResponse::empty(404)])?;
    let client = client_for(&server)?;

    let input = WarrantyLookupInput {
        imei: "356789012345678".to_owned(),
        ..WarrantyLookupInput::default()
    };
    let result = client.lookup_warranty(&input)?;
    let result = result.expect("warranty found");
    assert_eq!(result.device.product_name, "iPhone 15");
    assert_eq!(result.warranty.status, "ACTIVE");

    let missing = client.lookup_warranty(&input)?;
    assert!(missing.is_none());

    let requests = server.finish()?;
    assert_eq!(requests[0].path(), "/api/warranty-lookup");
    assert_eq!(requests[0].json_body()?, json!({"imei": "356789012345678"}));
    Ok(())
}
