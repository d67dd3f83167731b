//  Copyright 2026 meshcache contributors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

/// Error kinds surfaced by the core and the transport layer.
///
/// Propagation policy (spec §7): peer errors are recovered locally and never
/// surfaced on their own if the local loader then succeeds; loader errors
/// and invalid-input errors are surfaced verbatim; a duplicate registration
/// is a programming error and is expected to abort the caller rather than be
/// handled.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Empty key, nil loader, or a second peer registration on one group.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The namespace was never registered.
    #[error("no such group: {0}")]
    NotFound(String),

    /// The authoritative loader rejected the key. Surfaced verbatim.
    #[error("loader failed: {0}")]
    LoaderFailure(String),

    /// A remote peer failed to serve the key. Recovered locally by falling
    /// back to the loader; only ever surfaced if that fallback also fails.
    #[error("peer fetch failed: {0}")]
    PeerFailure(String),

    /// A malformed inter-node message. Folded into [`Error::PeerFailure`]
    /// at the point it is raised, per spec §7.
    #[error("malformed inter-node message: {0}")]
    SerializationFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;
