use std::collections::HashMap;

use cat_match_engine::{
    db_types::{Cat, MatchRequest, User},
    events::EventProducers,
    MatchError,
    MatchFlowApi,
    SqliteDatabase,
};
use cucumber::World;
use log::*;

use crate::support::prepare_test_env;

#[derive(Default, Debug, World)]
pub struct CatMatchWorld {
    pub system: Option<MatchSystem>,
}

#[derive(Debug)]
pub struct MatchSystem {
    pub api: MatchFlowApi<SqliteDatabase>,
    pub users: HashMap<String, User>,
    pub cats: HashMap<String, Cat>,
    /// Every request created during the scenario, keyed by (issuer cat name, target cat name)
    pub requests: HashMap<(String, String), MatchRequest>,
    pub last_error: Option<MatchError>,
}

impl CatMatchWorld {
    pub fn system(&mut self) -> &mut MatchSystem {
        self.system.as_mut().expect("The scenario has not set up a fresh install")
    }
}

impl MatchSystem {
    pub async fn new() -> Self {
        let db = prepare_test_env(5).await;
        debug!("🚀️ Created database: {}", db.url());
        let api = MatchFlowApi::new(db, EventProducers::default());
        Self {
            api,
            users: HashMap::new(),
            cats: HashMap::new(),
            requests: HashMap::new(),
            last_error: None,
        }
    }

    pub fn user(&self, name: &str) -> &User {
        self.users.get(name).unwrap_or_else(|| panic!("Unknown user {name}"))
    }

    pub fn cat(&self, name: &str) -> &Cat {
        self.cats.get(name).unwrap_or_else(|| panic!("Unknown cat {name}"))
    }

    pub fn request(&self, issuer: &str, target: &str) -> &MatchRequest {
        self.requests
            .get(&(issuer.to_string(), target.to_string()))
            .unwrap_or_else(|| panic!("No request from {issuer} to {target} was created"))
    }

    pub fn record<T>(&mut self, result: Result<T, MatchError>) -> Option<T> {
        match result {
            Ok(v) => {
                self.last_error = None;
                Some(v)
            },
            Err(e) => {
                debug!("🚀️ Call failed: {e}");
                self.last_error = Some(e);
                None
            },
        }
    }
}
