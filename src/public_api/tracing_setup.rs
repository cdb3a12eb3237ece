/*
 *   Copyright (c) 2024 R3BL LLC
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Where the display layer writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

/// Initialize the tracing system with a single display layer at the given level.
///
/// Hosts with their own subscriber setup should skip this and compose layers
/// themselves; the editor only ever emits `tracing` events, it never requires a
/// subscriber.
pub fn init(
    level: tracing::Level,
    preference: DisplayPreference,
) -> miette::Result<()> {
    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    let display_layer = match preference {
        DisplayPreference::Stdout => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .boxed(),
        DisplayPreference::Stderr => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(level_filter)
        .with(display_layer)
        .try_init()
        .map_err(|error| miette::miette!("failed to init tracing: {error}"))
}
