/*
    pvg-core, primer vector guidance and two-body astrodynamics
    Copyright (C) 2021 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::{InvalidLengthSnafu, PvgError};
use crate::linalg::SVector;
use crate::V3;
use snafu::ensure;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Number of slots in the state and costate vector.
pub const STATE_COSTATE_SIZE: usize = 15;

/// Index of the position in the state and costate vector.
pub const R_IDX: usize = 0;
/// Index of the velocity.
pub const V_IDX: usize = 3;
/// Index of the velocity costate (the primer vector).
pub const PV_IDX: usize = 6;
/// Index of the position costate.
pub const PR_IDX: usize = 9;
/// Index of the mass.
pub const M_IDX: usize = 12;
/// Index of the mass costate.
pub const PM_IDX: usize = 13;
/// Index of the cumulative delta-v.
pub const DV_IDX: usize = 14;

/// The state and costate vector integrated across the phases of a trajectory.
///
/// Callers slice this vector positionally, so the layout is fixed:
///
/// | slots  | content                        |
/// |--------|--------------------------------|
/// | 0..3   | position `R`                   |
/// | 3..6   | velocity `V`                   |
/// | 6..9   | velocity costate `PV`          |
/// | 9..12  | position costate `PR`          |
/// | 12     | mass `M`                       |
/// | 13     | mass costate `Pm`              |
/// | 14     | cumulative delta-v `DV`        |
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StateCostate(pub SVector<f64, STATE_COSTATE_SIZE>);

impl StateCostate {
    /// Builds a new state and costate vector with a zero cumulative delta-v.
    pub fn new(r: V3, v: V3, pv: V3, pr: V3, m: f64, pm: f64) -> Self {
        let mut me = Self::zeros();
        me.set_r(r);
        me.set_v(v);
        me.set_pv(pv);
        me.set_pr(pr);
        me.set_m(m);
        me.set_pm(pm);
        me
    }

    pub fn zeros() -> Self {
        Self(SVector::zeros())
    }

    /// Builds the vector from 14 or 15 values. When only 14 are provided, the cumulative delta-v is zero.
    pub fn from_slice(data: &[f64]) -> Result<Self, PvgError> {
        ensure!(
            data.len() == STATE_COSTATE_SIZE || data.len() == STATE_COSTATE_SIZE - 1,
            InvalidLengthSnafu { len: data.len() }
        );
        let mut me = Self::zeros();
        me.0.as_mut_slice()[..data.len()].copy_from_slice(data);
        Ok(me)
    }

    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }

    pub fn r(&self) -> V3 {
        self.0.fixed_rows::<3>(R_IDX).into_owned()
    }

    pub fn v(&self) -> V3 {
        self.0.fixed_rows::<3>(V_IDX).into_owned()
    }

    pub fn pv(&self) -> V3 {
        self.0.fixed_rows::<3>(PV_IDX).into_owned()
    }

    pub fn pr(&self) -> V3 {
        self.0.fixed_rows::<3>(PR_IDX).into_owned()
    }

    pub fn m(&self) -> f64 {
        self.0[M_IDX]
    }

    pub fn pm(&self) -> f64 {
        self.0[PM_IDX]
    }

    pub fn dv(&self) -> f64 {
        self.0[DV_IDX]
    }

    pub fn set_r(&mut self, r: V3) {
        self.0.fixed_rows_mut::<3>(R_IDX).copy_from(&r);
    }

    pub fn set_v(&mut self, v: V3) {
        self.0.fixed_rows_mut::<3>(V_IDX).copy_from(&v);
    }

    pub fn set_pv(&mut self, pv: V3) {
        self.0.fixed_rows_mut::<3>(PV_IDX).copy_from(&pv);
    }

    pub fn set_pr(&mut self, pr: V3) {
        self.0.fixed_rows_mut::<3>(PR_IDX).copy_from(&pr);
    }

    pub fn set_m(&mut self, m: f64) {
        self.0[M_IDX] = m;
    }

    pub fn set_pm(&mut self, pm: f64) {
        self.0[PM_IDX] = pm;
    }

    pub fn set_dv(&mut self, dv: f64) {
        self.0[DV_IDX] = dv;
    }

    /// Returns true if every slot is finite
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|x| x.is_finite())
    }

    /// Radius, i.e. the norm of the position
    pub fn rmag(&self) -> f64 {
        self.r().norm()
    }

    /// Speed, i.e. the norm of the velocity
    pub fn vmag(&self) -> f64 {
        self.v().norm()
    }

    /// Specific angular momentum vector
    pub fn hvec(&self) -> V3 {
        self.r().cross(&self.v())
    }
}

impl From<SVector<f64, STATE_COSTATE_SIZE>> for StateCostate {
    fn from(vector: SVector<f64, STATE_COSTATE_SIZE>) -> Self {
        Self(vector)
    }
}

impl From<StateCostate> for SVector<f64, STATE_COSTATE_SIZE> {
    fn from(state: StateCostate) -> Self {
        state.0
    }
}

impl Index<usize> for StateCostate {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl IndexMut<usize> for StateCostate {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

impl fmt::Display for StateCostate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let r = self.r();
        let v = self.v();
        let pv = self.pv();
        let pr = self.pr();
        write!(
            f,
            "R = [{:.6}, {:.6}, {:.6}]\tV = [{:.6}, {:.6}, {:.6}]\tPV = [{:.6e}, {:.6e}, {:.6e}]\tPR = [{:.6e}, {:.6e}, {:.6e}]\tm = {:.6}\tPm = {:.6e}\tdv = {:.6}",
            r.x,
            r.y,
            r.z,
            v.x,
            v.y,
            v.z,
            pv.x,
            pv.y,
            pv.z,
            pr.x,
            pr.y,
            pr.z,
            self.m(),
            self.pm(),
            self.dv()
        )
    }
}
