//! Shared world for scenario suites driving the HTTP surface.
//!
//! Step functions are synchronous, so the world owns an Actix system runner
//! and blocks on each request. Every request goes through a freshly
//! initialised app sharing one `HttpState`, so stored data persists across
//! steps.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use actix_web::test::TestRequest;
use backpacker_connect::inbound::http::state::HttpState;
use serde_json::Value;

use crate::app::{memory_state, send, sign_up};

pub(crate) struct TravelWorld {
    runner: actix_rt::SystemRunner,
    state: HttpState,
    travellers: HashMap<String, (String, String)>,
    pub(crate) trip_id: Option<String>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Value,
}

impl TravelWorld {
    fn new() -> Self {
        Self {
            runner: actix_rt::System::new(),
            state: memory_state(),
            travellers: HashMap::new(),
            trip_id: None,
            last_status: None,
            last_body: Value::Null,
        }
    }
}

pub(crate) struct WorldFixture {
    world: Rc<RefCell<TravelWorld>>,
}

impl WorldFixture {
    /// Register `name` and remember their id and token.
    pub(crate) fn sign_up(&self, name: &str) {
        let signed_in = {
            let world = self.world.borrow();
            let state = world.state.clone();
            world.runner.block_on(async move { sign_up(&state, name).await })
        };
        self.world
            .borrow_mut()
            .travellers
            .insert(name.to_owned(), signed_in);
    }

    pub(crate) fn user_id(&self, name: &str) -> String {
        self.world
            .borrow()
            .travellers
            .get(name)
            .map(|(id, _)| id.clone())
            .unwrap_or_else(|| panic!("{name} has not signed up"))
    }

    /// Send `request`, adding `name`'s bearer token when given.
    pub(crate) fn call(&self, request: TestRequest, as_user: Option<&str>) {
        let request = match as_user {
            Some(name) => {
                let token = self
                    .world
                    .borrow()
                    .travellers
                    .get(name)
                    .map(|(_, token)| token.clone())
                    .unwrap_or_else(|| panic!("{name} has not signed up"));
                request.insert_header(("Authorization", format!("Bearer {token}")))
            }
            None => request,
        };
        let (status, body) = {
            let world = self.world.borrow();
            let state = world.state.clone();
            world
                .runner
                .block_on(async move { send(&state, request.to_request()).await })
        };
        let mut world = self.world.borrow_mut();
        world.last_status = Some(status);
        world.last_body = body;
    }

    pub(crate) fn trip_path(&self, suffix: &str) -> String {
        let world = self.world.borrow();
        let id = world.trip_id.as_deref().expect("a trip has been posted");
        format!("/api/v1/travel-intents/{id}{suffix}")
    }

    pub(crate) fn world(&self) -> Rc<RefCell<TravelWorld>> {
        self.world.clone()
    }
}

pub(crate) fn new_world() -> WorldFixture {
    WorldFixture {
        world: Rc::new(RefCell::new(TravelWorld::new())),
    }
}
