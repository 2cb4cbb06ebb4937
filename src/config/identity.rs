// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Device identity reported to Modbus clients

use serde::{Deserialize, Serialize};

/// Identification strings of the simulated device.
///
/// They are returned by the Modbus *Report Server ID* function so that
/// scanners and HMIs see a plausible device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub vendor_name: String,
    pub product_code: String,
    pub vendor_url: String,
    pub product_name: String,
    pub model_name: String,
    pub revision: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            vendor_name: "akiUP".to_string(),
            product_code: "IOP".to_string(),
            vendor_url: "https://github.com/akiUp/ICSonPySim".to_string(),
            product_name: "ICSonPy".to_string(),
            model_name: "ICS Simulation".to_string(),
            revision: "0.0.1".to_string(),
        }
    }
}

impl IdentityConfig {
    /// Identification payload of Report Server ID, fields separated by `;`.
    pub fn server_id_payload(&self) -> Vec<u8> {
        [
            self.vendor_name.as_str(),
            self.product_code.as_str(),
            self.vendor_url.as_str(),
            self.product_name.as_str(),
            self.model_name.as_str(),
            self.revision.as_str(),
        ]
        .join(";")
        .into_bytes()
    }
}
