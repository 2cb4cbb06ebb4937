// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus server implementation for the process simulator
//!
//! For avoiding confusion with the Modbus master/slave terminology, this module uses
//! the terms "server" and "client" instead. The server is the simulated device,
//! the client is the HMI, the scanner or the operator tool talking to it.
//!
//! ## Point Map
//!
//! The protocol address of a point is its point address, without any offset.
//!
//! | Bank | Address | Point | Access |
//! |------|---------|-------|--------|
//! | Coil | 100 | Start request | R/W |
//! | Coil | 110 | Stop request | R/W |
//! | Coil | 120 | Valve open | R/W |
//! | Coil | 130 | Auto mode | R/W |
//! | Discrete input | 100 | Motor running | R |
//! | Discrete input | 110 | Motor tripped | R |
//! | Input register | 100 | Motor load (%) | R |
//! | Input register | 110 | Flow | R |
//! | Input register | 120 | Tank level | R |
//! | Input register | 130 | Tank drain | R |
//! | Holding register | 100 | Hi setpoint | R/W |
//! | Holding register | 110 | Lo setpoint | R/W |
//!
//! Any other address answers with an `IllegalDataAddress` exception.

use std::{future, sync::Arc};

use log::{debug, error};
use tokio_modbus::bytes::Bytes;
use tokio_modbus::prelude::*;

use crate::config::{IdentityConfig, ModbusConfig};
use crate::plant::{BoolBank, PointError, PointStore, WordBank};

/// Largest quantity of a Read Coils / Read Discrete Inputs request.
pub const MAX_READ_BITS: u16 = 2000;
/// Largest quantity of a Read Holding / Input Registers request.
pub const MAX_READ_REGISTERS: u16 = 125;
/// Largest quantity of a Write Multiple Coils request.
pub const MAX_WRITE_BITS: u16 = 1968;
/// Largest quantity of a Write Multiple Registers request.
pub const MAX_WRITE_REGISTERS: u16 = 123;
/// Largest write quantity of a Read/Write Multiple Registers request.
pub const MAX_READ_WRITE_REGISTERS: u16 = 121;
/// Largest identification payload returned by Report Server ID.
pub const MAX_SERVER_ID_LEN: usize = 240;

const REPORT_SERVER_ID: u8 = 0x11;
const RUN_INDICATOR_ON: u8 = 0xFF;

/// A Modbus TCP service exposing the [`PointStore`] of the simulated plant.
///
/// Every request is answered from the shared store, so a value read over
/// Modbus is always a value committed by a complete process step, and a write
/// is visible to the very next step.
///
/// The service is cheap to clone: every connection gets its own instance
/// sharing the same store.
#[derive(Debug, Clone)]
pub struct ProcessModbusServer {
    store: Arc<PointStore>,
    unit_id: u8,
    server_id: Arc<Vec<u8>>,
}

impl tokio_modbus::server::Service for ProcessModbusServer {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    /// Process a Modbus request and provide a response
    ///
    /// This method handles the following function codes:
    /// - 0x01: Read Coils
    /// - 0x02: Read Discrete Inputs
    /// - 0x03: Read Holding Registers
    /// - 0x04: Read Input Registers
    /// - 0x05: Write Single Coil
    /// - 0x06: Write Single Register
    /// - 0x0F: Write Multiple Coils
    /// - 0x10: Write Multiple Registers
    /// - 0x11: Report Server ID
    /// - 0x16: Mask Write Register
    /// - 0x17: Read/Write Multiple Registers
    ///
    /// Any other function code will return an IllegalFunction exception.
    fn call(&self, req: Self::Request) -> Self::Future {
        debug!("Received Modbus request: {:?}", req);
        let res = self.handle(req);

        if let Err(e) = &res {
            error!("Modbus request error: {:?}", e);
        }

        future::ready(res)
    }
}

impl ProcessModbusServer {
    /// Create a service backed by `store`, identified with the defaults of
    /// [`IdentityConfig`].
    pub fn new(store: Arc<PointStore>) -> Self {
        Self::with_identity(store, 0, &IdentityConfig::default())
    }

    /// Create a service reporting `unit_id` and `identity` to Report Server ID.
    pub fn with_identity(store: Arc<PointStore>, unit_id: u8, identity: &IdentityConfig) -> Self {
        let mut server_id = identity.server_id_payload();
        if server_id.len() > MAX_SERVER_ID_LEN {
            debug!(
                "Server identification is {} bytes long, truncated to {}",
                server_id.len(),
                MAX_SERVER_ID_LEN
            );
            server_id.truncate(MAX_SERVER_ID_LEN);
        }
        Self {
            store,
            unit_id,
            server_id: Arc::new(server_id),
        }
    }

    /// Create a service from the `modbus` and `identity` configuration sections.
    pub fn from_config(
        store: Arc<PointStore>,
        modbus: &ModbusConfig,
        identity: &IdentityConfig,
    ) -> Self {
        Self::with_identity(store, modbus.unit_id, identity)
    }

    pub fn store(&self) -> &Arc<PointStore> {
        &self.store
    }

    fn handle(&self, req: Request<'static>) -> Result<Response, ExceptionCode> {
        match req {
            Request::ReadCoils(addr, cnt) => {
                debug!("Reading {} coils starting from address {}", cnt, addr);
                check_quantity(cnt, MAX_READ_BITS)?;
                self.store
                    .read_bools(BoolBank::Coil, addr, cnt)
                    .map(Response::ReadCoils)
                    .map_err(exception)
            }
            Request::ReadDiscreteInputs(addr, cnt) => {
                debug!(
                    "Reading {} discrete inputs starting from address {}",
                    cnt, addr
                );
                check_quantity(cnt, MAX_READ_BITS)?;
                self.store
                    .read_bools(BoolBank::DiscreteInput, addr, cnt)
                    .map(Response::ReadDiscreteInputs)
                    .map_err(exception)
            }
            Request::ReadInputRegisters(addr, cnt) => {
                debug!(
                    "Reading {} input registers starting from address {}",
                    cnt, addr
                );
                check_quantity(cnt, MAX_READ_REGISTERS)?;
                self.store
                    .read_words(WordBank::InputRegister, addr, cnt)
                    .map(Response::ReadInputRegisters)
                    .map_err(exception)
            }
            Request::ReadHoldingRegisters(addr, cnt) => {
                debug!(
                    "Reading {} holding registers starting from address {}",
                    cnt, addr
                );
                check_quantity(cnt, MAX_READ_REGISTERS)?;
                self.store
                    .read_words(WordBank::HoldingRegister, addr, cnt)
                    .map(Response::ReadHoldingRegisters)
                    .map_err(exception)
            }
            Request::WriteSingleCoil(addr, value) => {
                debug!("Writing value {} to coil {}", value, addr);
                self.store
                    .write_bool(BoolBank::Coil, addr, value)
                    .map(|_| Response::WriteSingleCoil(addr, value))
                    .map_err(exception)
            }
            Request::WriteMultipleCoils(addr, values) => {
                debug!(
                    "Writing {} values to coils starting from address {}",
                    values.len(),
                    addr
                );
                let cnt = quantity_of(values.len(), MAX_WRITE_BITS)?;
                self.store
                    .write_bools(BoolBank::Coil, addr, &values)
                    .map(|_| Response::WriteMultipleCoils(addr, cnt))
                    .map_err(exception)
            }
            Request::WriteSingleRegister(addr, value) => {
                debug!("Writing value {} to holding register {}", value, addr);
                self.store
                    .write_word(WordBank::HoldingRegister, addr, value)
                    .map(|_| Response::WriteSingleRegister(addr, value))
                    .map_err(exception)
            }
            Request::WriteMultipleRegisters(addr, values) => {
                debug!(
                    "Writing {} values to holding registers starting from address {}",
                    values.len(),
                    addr
                );
                let cnt = quantity_of(values.len(), MAX_WRITE_REGISTERS)?;
                self.store
                    .write_words(WordBank::HoldingRegister, addr, &values)
                    .map(|_| Response::WriteMultipleRegisters(addr, cnt))
                    .map_err(exception)
            }
            Request::MaskWriteRegister(addr, and_mask, or_mask) => {
                debug!(
                    "Masking holding register {} with AND {:#06x} OR {:#06x}",
                    addr, and_mask, or_mask
                );
                self.store
                    .update_word(WordBank::HoldingRegister, addr, |current| {
                        apply_mask(current, and_mask, or_mask)
                    })
                    .map(|_| Response::MaskWriteRegister(addr, and_mask, or_mask))
                    .map_err(exception)
            }
            Request::ReadWriteMultipleRegisters(read_addr, read_cnt, write_addr, values) => {
                debug!(
                    "Writing {} holding registers at {} then reading {} at {}",
                    values.len(),
                    write_addr,
                    read_cnt,
                    read_addr
                );
                check_quantity(read_cnt, MAX_READ_REGISTERS)?;
                quantity_of(values.len(), MAX_READ_WRITE_REGISTERS)?;
                self.store
                    .write_then_read_words(
                        WordBank::HoldingRegister,
                        write_addr,
                        &values,
                        read_addr,
                        read_cnt,
                    )
                    .map(Response::ReadWriteMultipleRegisters)
                    .map_err(exception)
            }
            Request::ReportServerId => {
                debug!("Reporting server identification");
                Ok(self.report_server_id())
            }
            _ => {
                error!(
                    "Exception::IllegalFunction - Unimplemented function code in request: {req:?}"
                );
                Err(ExceptionCode::IllegalFunction)
            }
        }
    }
}

impl ProcessModbusServer {
    /// Report Server ID response, framed by hand.
    ///
    /// tokio-modbus 0.16 sizes a `Response::ReportServerId` one byte shorter
    /// than what it encodes, which truncates the frame on the wire. The same
    /// PDU sent as a custom response is sized from its data and decoded as
    /// `Response::ReportServerId` by the client.
    fn report_server_id(&self) -> Response {
        let mut pdu = Vec::with_capacity(self.server_id.len() + 3);
        // server id (1) + run indicator (1) + identification, at most 242
        pdu.push((self.server_id.len() + 2) as u8);
        pdu.push(self.unit_id);
        pdu.push(RUN_INDICATOR_ON);
        pdu.extend_from_slice(&self.server_id);
        Response::Custom(REPORT_SERVER_ID, Bytes::from(pdu))
    }
}

/// Result of Mask Write Register: `(current AND and_mask) OR (or_mask AND NOT and_mask)`.
pub fn apply_mask(current: u16, and_mask: u16, or_mask: u16) -> u16 {
    (current & and_mask) | (or_mask & !and_mask)
}

fn check_quantity(cnt: u16, max: u16) -> Result<(), ExceptionCode> {
    if cnt == 0 || cnt > max {
        error!(
            "Exception::IllegalDataValue - quantity {} outside 1-{}",
            cnt, max
        );
        return Err(ExceptionCode::IllegalDataValue);
    }
    Ok(())
}

fn quantity_of(len: usize, max: u16) -> Result<u16, ExceptionCode> {
    let cnt = u16::try_from(len).map_err(|_| ExceptionCode::IllegalDataValue)?;
    check_quantity(cnt, max)?;
    Ok(cnt)
}

fn exception(err: PointError) -> ExceptionCode {
    match err {
        PointError::UnknownPoint { .. } => {
            error!("Exception::IllegalDataAddress - {}", err);
            ExceptionCode::IllegalDataAddress
        }
    }
}
