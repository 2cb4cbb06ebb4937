// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Concurrency-safe point store
//!
//! The store keeps the live [`ProcessImage`] behind a single exclusive lock.
//! Every access, whether a single point, a range of points or a whole process
//! step, holds that lock for its full duration, so an external reader never
//! observes a half-applied step (e.g. `run=true` with a load from before a
//! trip).

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;
use thiserror::Error;

use super::image::ProcessImage;
use super::points::{Bank, BoolBank, BoolPoint, WordBank, WordPoint};

/// Errors reported by point accesses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointError {
    #[error("No point at {bank} address {address}")]
    UnknownPoint { bank: Bank, address: u16 },
}

/// Shared table of all points of the plant.
#[derive(Debug, Default)]
pub struct PointStore {
    image: Mutex<ProcessImage>,
}

impl PointStore {
    pub fn new(initial: ProcessImage) -> Self {
        Self {
            image: Mutex::new(initial),
        }
    }

    // The image is plain data, a panic while holding the lock cannot leave it
    // in a state that is unsafe to read.
    fn lock(&self) -> MutexGuard<'_, ProcessImage> {
        self.image.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn read_bool(&self, bank: BoolBank, address: u16) -> Result<bool, PointError> {
        let point = resolve_bool(bank, address)?;
        Ok(self.lock().bool_value(point))
    }

    pub fn write_bool(&self, bank: BoolBank, address: u16, value: bool) -> Result<(), PointError> {
        let point = resolve_bool(bank, address)?;
        self.lock().set_bool(point, value);
        Ok(())
    }

    pub fn read_word(&self, bank: WordBank, address: u16) -> Result<u16, PointError> {
        let point = resolve_word(bank, address)?;
        Ok(self.lock().word_value(point))
    }

    pub fn write_word(&self, bank: WordBank, address: u16, value: u16) -> Result<(), PointError> {
        let point = resolve_word(bank, address)?;
        self.lock().set_word(point, value);
        Ok(())
    }

    /// Read `count` consecutive boolean points starting at `address`.
    ///
    /// Fails with [`PointError::UnknownPoint`] on the first address of the range
    /// that has no point.
    pub fn read_bools(
        &self,
        bank: BoolBank,
        address: u16,
        count: u16,
    ) -> Result<Vec<bool>, PointError> {
        let points = resolve_bool_range(bank, address, count as usize)?;
        let image = self.lock();
        Ok(points.into_iter().map(|p| image.bool_value(p)).collect())
    }

    /// Write consecutive boolean points starting at `address`.
    ///
    /// Every address is checked before anything is written: either all values
    /// are stored or none.
    pub fn write_bools(
        &self,
        bank: BoolBank,
        address: u16,
        values: &[bool],
    ) -> Result<(), PointError> {
        let points = resolve_bool_range(bank, address, values.len())?;
        let mut image = self.lock();
        for (point, value) in points.into_iter().zip(values) {
            image.set_bool(point, *value);
        }
        debug!(
            "Wrote {} {} point(s) starting at address {}",
            values.len(),
            Bank::from(bank),
            address
        );
        Ok(())
    }

    /// Read `count` consecutive word points starting at `address`.
    pub fn read_words(
        &self,
        bank: WordBank,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, PointError> {
        let points = resolve_word_range(bank, address, count as usize)?;
        let image = self.lock();
        Ok(points.into_iter().map(|p| image.word_value(p)).collect())
    }

    /// Write consecutive word points starting at `address`, all or nothing.
    pub fn write_words(
        &self,
        bank: WordBank,
        address: u16,
        values: &[u16],
    ) -> Result<(), PointError> {
        let points = resolve_word_range(bank, address, values.len())?;
        let mut image = self.lock();
        for (point, value) in points.into_iter().zip(values) {
            image.set_word(point, *value);
        }
        debug!(
            "Wrote {} {} point(s) starting at address {}",
            values.len(),
            Bank::from(bank),
            address
        );
        Ok(())
    }

    /// Read-modify-write a single word point under one lock acquisition.
    ///
    /// Returns the value that was stored.
    pub fn update_word<F>(&self, bank: WordBank, address: u16, f: F) -> Result<u16, PointError>
    where
        F: FnOnce(u16) -> u16,
    {
        let point = resolve_word(bank, address)?;
        let mut image = self.lock();
        let value = f(image.word_value(point));
        image.set_word(point, value);
        Ok(value)
    }

    /// Write `values` at `write_address`, then read `count` points at
    /// `read_address`, both under one lock acquisition.
    ///
    /// Both ranges are resolved first: when either one is invalid nothing is
    /// written.
    pub fn write_then_read_words(
        &self,
        bank: WordBank,
        write_address: u16,
        values: &[u16],
        read_address: u16,
        count: u16,
    ) -> Result<Vec<u16>, PointError> {
        let written = resolve_word_range(bank, write_address, values.len())?;
        let read = resolve_word_range(bank, read_address, count as usize)?;
        let mut image = self.lock();
        for (point, value) in written.into_iter().zip(values) {
            image.set_word(point, *value);
        }
        Ok(read.into_iter().map(|p| image.word_value(p)).collect())
    }

    /// Copy of every point at this instant.
    pub fn snapshot(&self) -> ProcessImage {
        *self.lock()
    }

    /// Replace every point with the values of `image` in one operation.
    pub fn commit(&self, image: ProcessImage) {
        *self.lock() = image;
    }

    /// Snapshot, compute and commit without releasing the lock in between.
    ///
    /// `f` receives the current image and returns the image to commit along
    /// with a value handed back to the caller. No other access to the store
    /// can interleave, so writes from the protocol layer are never lost
    /// between the snapshot and the commit.
    pub fn transact<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ProcessImage) -> (ProcessImage, R),
    {
        let mut image = self.lock();
        let (next, result) = f(&image);
        *image = next;
        result
    }
}

fn resolve_bool(bank: BoolBank, address: u16) -> Result<BoolPoint, PointError> {
    BoolPoint::lookup(bank, address).ok_or(PointError::UnknownPoint {
        bank: bank.into(),
        address,
    })
}

fn resolve_word(bank: WordBank, address: u16) -> Result<WordPoint, PointError> {
    WordPoint::lookup(bank, address).ok_or(PointError::UnknownPoint {
        bank: bank.into(),
        address,
    })
}

fn range_addresses(address: u16, count: usize) -> impl Iterator<Item = u32> {
    (0..count as u32).map(move |offset| address as u32 + offset)
}

fn resolve_bool_range(
    bank: BoolBank,
    address: u16,
    count: usize,
) -> Result<Vec<BoolPoint>, PointError> {
    range_addresses(address, count)
        .map(|addr| match u16::try_from(addr) {
            Ok(addr) => resolve_bool(bank, addr),
            Err(_) => Err(PointError::UnknownPoint {
                bank: bank.into(),
                address: u16::MAX,
            }),
        })
        .collect()
}

fn resolve_word_range(
    bank: WordBank,
    address: u16,
    count: usize,
) -> Result<Vec<WordPoint>, PointError> {
    range_addresses(address, count)
        .map(|addr| match u16::try_from(addr) {
            Ok(addr) => resolve_word(bank, addr),
            Err(_) => Err(PointError::UnknownPoint {
                bank: bank.into(),
                address: u16::MAX,
            }),
        })
        .collect()
}
