// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Connection identity as seen by network interceptors

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::sync::OnceLock;

use url::Url;

/// Where a connection goes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Route {
    /// Route for a request URL
    pub fn for_url(url: &Url) -> Self {
        Self {
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or("").to_string(),
            port: url.port_or_known_default().unwrap_or(0),
        }
    }
}

/// Connection handed to network interceptors
///
/// reqwest pools connections per route and does not expose the socket, so
/// the id is a hash of the route under a seed chosen once per process.
/// Requests that may share a pooled connection share an id. The id is a
/// correlation hint within one process, never a durable identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    id: u64,
    route: Route,
}

impl Connection {
    /// Connection for a request URL
    pub fn for_url(url: &Url) -> Self {
        let route = Route::for_url(url);
        Self {
            id: process_seed().hash_one(&route),
            route,
        }
    }

    /// Process-local correlation id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Route of this connection
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Whether the connection was reused from the pool.
    ///
    /// reqwest gives no reuse signal, so this is always `false`.
    pub fn reused(&self) -> bool {
        false
    }
}

fn process_seed() -> &'static RandomState {
    static SEED: OnceLock<RandomState> = OnceLock::new();
    SEED.get_or_init(RandomState::new)
}
