//! Steps shared by the HTTP scenario suites.

use rstest_bdd_macros::{given, then};
use serde_json::Value;

use crate::travel_world::WorldFixture;

#[given("a running API over in-memory stores")]
fn a_running_api_over_in_memory_stores(world: &WorldFixture) {
    let _ = world;
}

#[given("traveller {name} has signed up")]
fn traveller_has_signed_up(world: &WorldFixture, name: String) {
    world.sign_up(&name);
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: u16) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    assert_eq!(ctx.last_status, Some(status), "body: {}", ctx.last_body);
}

#[then("the error detail code is {code}")]
fn the_error_detail_code_is(world: &WorldFixture, code: String) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    assert_eq!(
        ctx.last_body
            .pointer("/details/code")
            .and_then(Value::as_str),
        Some(code.as_str())
    );
}
