// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned key management for online rotation: one current key for new
//! evaluations, older generations kept available until explicitly retired

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::ciphersuite::{ELEMENT_LENGTH, SCALAR_LENGTH};
use crate::server::OprfServer;
use crate::util::Mode;
use crate::{Error, Result};

/// A consistent snapshot of the current key version and its server. Holding
/// the `Arc` pins the key across later rotations and retirements, so an
/// in-flight evaluation always completes against the version it observed.
#[derive(Clone, Debug)]
pub struct CurrentKey {
    /// The version number of the current key.
    pub version: u32,
    /// The server evaluating under the current key.
    pub server: Arc<OprfServer>,
}

/// Metadata about one key version; never exposes private material.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyMetadata {
    /// The version number.
    pub version: u32,
    /// The version's public key, SEC1 compressed.
    pub public_key: [u8; ELEMENT_LENGTH],
    /// Whether this version is the current one.
    pub is_current: bool,
}

struct ManagerState {
    servers: BTreeMap<u32, Arc<OprfServer>>,
    current: CurrentKey,
}

/// Manages versioned OPRF keys for rotation support.
///
/// New evaluations go through the current key; earlier versions stay
/// resolvable so outputs derived before a rotation remain verifiable until
/// their version is retired. Lookups and the `current` snapshot are served
/// to any number of threads in parallel; rotations and retirements are
/// serialized internally and swap the snapshot atomically.
pub struct KeyManager {
    mode: Mode,
    state: RwLock<ManagerState>,
}

impl KeyManager {
    /// Creates a manager with a freshly generated random key at version 1.
    pub fn new<R: RngCore + CryptoRng>(mode: Mode, rng: &mut R) -> Self {
        Self::with_initial_server(mode, OprfServer::new(mode, rng))
    }

    /// Creates a manager with an existing 32-byte private key at version 1.
    ///
    /// # Errors
    /// [`Error::Scalar`] if the bytes are not a canonical nonzero scalar.
    pub fn new_with_key(mode: Mode, private_key: &[u8]) -> Result<Self> {
        Ok(Self::with_initial_server(
            mode,
            OprfServer::new_with_key(mode, private_key)?,
        ))
    }

    /// Restores a manager from several versioned private keys, making
    /// `current_version` current.
    ///
    /// # Errors
    /// - [`Error::UnknownKeyVersion`] if no keys are supplied, a version is
    ///   zero, or `current_version` is not among the supplied versions.
    /// - [`Error::Scalar`] if any key fails to decode.
    pub fn restore<'a, I>(mode: Mode, versioned_keys: I, current_version: u32) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, &'a [u8])>,
    {
        let mut servers = BTreeMap::new();
        for (version, private_key) in versioned_keys {
            if version == 0 {
                return Err(Error::UnknownKeyVersion(0));
            }
            servers.insert(
                version,
                Arc::new(OprfServer::new_with_key(mode, private_key)?),
            );
        }
        let server = servers
            .get(&current_version)
            .cloned()
            .ok_or(Error::UnknownKeyVersion(current_version))?;
        Ok(Self {
            mode,
            state: RwLock::new(ManagerState {
                servers,
                current: CurrentKey {
                    version: current_version,
                    server,
                },
            }),
        })
    }

    fn with_initial_server(mode: Mode, server: OprfServer) -> Self {
        let server = Arc::new(server);
        let mut servers = BTreeMap::new();
        servers.insert(1, Arc::clone(&server));
        Self {
            mode,
            state: RwLock::new(ManagerState {
                servers,
                current: CurrentKey { version: 1, server },
            }),
        }
    }

    /// The mode every key in this manager evaluates under.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns a consistent snapshot of the current key and version.
    pub fn current(&self) -> CurrentKey {
        self.read().current.clone()
    }

    /// The current version number.
    pub fn current_version(&self) -> u32 {
        self.read().current.version
    }

    /// The current version's public key, SEC1 compressed.
    pub fn current_public_key(&self) -> [u8; ELEMENT_LENGTH] {
        self.read().current.server.export_public_key()
    }

    /// Returns the server for a version, or `None` if it does not exist.
    pub fn server(&self, version: u32) -> Option<Arc<OprfServer>> {
        self.read().servers.get(&version).cloned()
    }

    /// Returns the server for a version.
    ///
    /// # Errors
    /// [`Error::UnknownKeyVersion`] if the version does not exist.
    pub fn server_or_err(&self, version: u32) -> Result<Arc<OprfServer>> {
        self.server(version)
            .ok_or(Error::UnknownKeyVersion(version))
    }

    /// Whether a version exists.
    pub fn has_version(&self, version: u32) -> bool {
        self.read().servers.contains_key(&version)
    }

    /// All installed version numbers in ascending order.
    pub fn versions(&self) -> Vec<u32> {
        self.read().servers.keys().copied().collect()
    }

    /// The public key for a version, or `None` if it does not exist.
    pub fn public_key(&self, version: u32) -> Option<[u8; ELEMENT_LENGTH]> {
        self.read()
            .servers
            .get(&version)
            .map(|server| server.export_public_key())
    }

    /// Rotates to a freshly generated random key and makes it current.
    /// Returns the new version number.
    pub fn rotate<R: RngCore + CryptoRng>(&self, rng: &mut R) -> u32 {
        self.install(OprfServer::new(self.mode, rng))
    }

    /// Rotates to a key derived deterministically from `(seed, info)`.
    /// Returns the new version number.
    ///
    /// # Errors
    /// See [`OprfServer::new_from_seed`].
    pub fn rotate_deterministic(&self, seed: &[u8], info: &[u8]) -> Result<u32> {
        Ok(self.install(OprfServer::new_from_seed(self.mode, seed, info)?))
    }

    /// Rotates to the supplied 32-byte private key. Returns the new version
    /// number.
    ///
    /// # Errors
    /// [`Error::Scalar`] if the bytes are not a canonical nonzero scalar.
    pub fn rotate_to(&self, private_key: &[u8]) -> Result<u32> {
        Ok(self.install(OprfServer::new_with_key(self.mode, private_key)?))
    }

    /// Retires (removes) an old key version. Returns whether the version
    /// existed. Evaluations still holding the version's server keep it
    /// alive; the key material is freed once the last handle drops.
    ///
    /// # Errors
    /// [`Error::RetireCurrentKey`] when asked to retire the current version.
    pub fn retire(&self, version: u32) -> Result<bool> {
        let mut state = self.write();
        if version == state.current.version {
            return Err(Error::RetireCurrentKey);
        }
        Ok(state.servers.remove(&version).is_some())
    }

    /// A snapshot of key metadata (versions and public keys), ascending by
    /// version. Useful for diagnostics without exposing private keys.
    pub fn metadata(&self) -> Vec<KeyMetadata> {
        let state = self.read();
        state
            .servers
            .iter()
            .map(|(&version, server)| KeyMetadata {
                version,
                public_key: server.export_public_key(),
                is_current: version == state.current.version,
            })
            .collect()
    }

    /// Exports every private key for backup, ascending by version. Each
    /// buffer is a fresh copy that wipes itself when dropped.
    pub fn export_all(&self) -> Vec<(u32, Zeroizing<[u8; SCALAR_LENGTH]>)> {
        self.read()
            .servers
            .iter()
            .map(|(&version, server)| (version, server.export_private_key()))
            .collect()
    }

    /// Exports the private key of one version, or `None` if it does not
    /// exist. The buffer is a fresh copy that wipes itself when dropped.
    pub fn export_private_key(&self, version: u32) -> Option<Zeroizing<[u8; SCALAR_LENGTH]>> {
        self.read()
            .servers
            .get(&version)
            .map(|server| server.export_private_key())
    }

    // Single writer path: version allocation, map insert and snapshot swap
    // happen under one write lock, so readers observe rotations atomically.
    fn install(&self, server: OprfServer) -> u32 {
        let server = Arc::new(server);
        let mut state = self.write();
        let mut version = state.current.version + 1;
        while state.servers.contains_key(&version) {
            version += 1;
        }
        state.servers.insert(version, Arc::clone(&server));
        state.current = CurrentKey { version, server };
        version
    }

    // Lock poisoning only occurs if a panic interrupts one of the short
    // critical sections above; the state they leave behind is still
    // consistent, so recover the guard instead of propagating the panic.
    fn read(&self) -> RwLockReadGuard<'_, ManagerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ManagerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.read();
        f.debug_struct("KeyManager")
            .field("mode", &self.mode)
            .field("current_version", &state.current.version)
            .field("versions", &state.servers.keys().collect::<Vec<_>>())
            .finish()
    }
}

///////////
// Tests //
// ===== //
///////////
