// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::flows::FlowState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no active session for user {0}")]
    NoSession(i64),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub state: FlowState,
}

// One live flow per user, keyed by internal user id. Sessions never touch
// disk; a restart drops them all.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<i64, Session>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Starting a flow silently abandons whatever the user had in flight.
    pub fn begin(&self, user_id: i64, state: FlowState) {
        self.map().insert(user_id, Session { user_id, state });
    }

    pub fn get(&self, user_id: i64) -> Option<Session> {
        self.map().get(&user_id).cloned()
    }

    pub fn advance(&self, user_id: i64, state: FlowState) -> Result<(), SessionError> {
        match self.map().get_mut(&user_id) {
            Some(session) => {
                session.state = state;
                Ok(())
            }
            None => Err(SessionError::NoSession(user_id)),
        }
    }

    pub fn end(&self, user_id: i64) {
        self.map().remove(&user_id);
    }
}
