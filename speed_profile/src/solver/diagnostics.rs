/*
 * Copyright (c):
 * 2025 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of lap-sim.
 *
 * lap-sim is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * lap-sim is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with lap-sim. If not, see <https://www.gnu.org/licenses/>.
 */

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CorrectionMethod {
    /// Closed form entry speed from the braking kinematics
    ModifiedTorricelli,
    /// First order speed difference over the segment travel time
    SpeedDifference
}

impl CorrectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionMethod::ModifiedTorricelli => { "modified torricelli" }
            CorrectionMethod::SpeedDifference => { "speed difference" }
        }
    }

    /// The closed form needs a positive `1 - kD` denominator and a non-negative
    /// numerator, anything else falls through to the speed difference formula.
    pub fn select(aero_term: f64, torricelli_numerator: f64) -> CorrectionMethod {
        if 1.0 - aero_term > 0.0 && torricelli_numerator >= 0.0 {
            CorrectionMethod::ModifiedTorricelli
        } else {
            CorrectionMethod::SpeedDifference
        }
    }
}

impl Display for CorrectionMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CorrectionScope {
    /// Only the entry at the failing index was lowered
    Local,
    /// Entries before the failing index were lowered too
    Retroactive
}

impl CorrectionScope {
    pub fn from_revised_before(revised_before: usize) -> CorrectionScope {
        match revised_before {
            0 => CorrectionScope::Local,
            _ => CorrectionScope::Retroactive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionScope::Local => { "local correction" }
            CorrectionScope::Retroactive => { "retroactive correction" }
        }
    }
}

impl Display for CorrectionScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-run counts of how backward corrections were resolved. Reporting only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticCounters {
    methods: BTreeMap<CorrectionMethod, usize>,
    scopes: BTreeMap<CorrectionScope, usize>
}

impl DiagnosticCounters {
    pub fn record_method(&mut self, method: CorrectionMethod) {
        *self.methods.entry(method).or_insert(0) += 1;
    }

    pub fn record_scope(&mut self, scope: CorrectionScope) {
        *self.scopes.entry(scope).or_insert(0) += 1;
    }

    pub fn method_count(&self, method: CorrectionMethod) -> usize {
        self.methods.get(&method).copied().unwrap_or(0)
    }

    pub fn scope_count(&self, scope: CorrectionScope) -> usize {
        self.scopes.get(&scope).copied().unwrap_or(0)
    }

    pub fn total_corrections(&self) -> usize {
        self.scopes.values().sum()
    }

    pub fn methods(&self) -> impl Iterator<Item=(&CorrectionMethod, &usize)> {
        self.methods.iter()
    }

    pub fn scopes(&self) -> impl Iterator<Item=(&CorrectionScope, &usize)> {
        self.scopes.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::diagnostics::{CorrectionMethod, CorrectionScope, DiagnosticCounters};

    #[test]
    fn method_selection_criterion() {
        assert_eq!(CorrectionMethod::select(0.0, 10.0), CorrectionMethod::ModifiedTorricelli);
        assert_eq!(CorrectionMethod::select(0.5, 0.0), CorrectionMethod::ModifiedTorricelli);
        assert_eq!(CorrectionMethod::select(1.0, 10.0), CorrectionMethod::SpeedDifference);
        assert_eq!(CorrectionMethod::select(1.5, 10.0), CorrectionMethod::SpeedDifference);
        assert_eq!(CorrectionMethod::select(0.1, -1.0), CorrectionMethod::SpeedDifference);
    }

    #[test]
    fn scope_from_revised_entries() {
        assert_eq!(CorrectionScope::from_revised_before(0), CorrectionScope::Local);
        assert_eq!(CorrectionScope::from_revised_before(3), CorrectionScope::Retroactive);
    }

    #[test]
    fn counters() {
        let mut counters = DiagnosticCounters::default();
        assert_eq!(counters.total_corrections(), 0);
        counters.record_method(CorrectionMethod::ModifiedTorricelli);
        counters.record_method(CorrectionMethod::ModifiedTorricelli);
        counters.record_method(CorrectionMethod::SpeedDifference);
        counters.record_scope(CorrectionScope::Retroactive);
        assert_eq!(counters.method_count(CorrectionMethod::ModifiedTorricelli), 2);
        assert_eq!(counters.method_count(CorrectionMethod::SpeedDifference), 1);
        assert_eq!(counters.scope_count(CorrectionScope::Local), 0);
        assert_eq!(counters.scope_count(CorrectionScope::Retroactive), 1);
        assert_eq!(counters.total_corrections(), 1);
        assert_eq!(counters.methods().count(), 2);
        assert_eq!(CorrectionScope::Local.to_string(), "local correction");
    }
}
