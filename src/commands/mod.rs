// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod chat;
pub mod debts;
pub mod export;
pub mod remind;
pub mod stats;
