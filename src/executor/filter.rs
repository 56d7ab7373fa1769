// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Selection operator.

use crate::core::{Attribute, Condition, Error, Predicate, Result, Tuple};

use super::operator::Operator;

/// Passes through the child tuples satisfying one condition, in child order.
pub struct Filter {
    child: Box<dyn Operator>,
    condition: Condition,
    predicate: Predicate,
    opened: bool,
    failed: bool,
    done: bool,
}

impl Filter {
    /// Bind `condition` against the child's schema.
    pub fn new(child: Box<dyn Operator>, condition: Condition) -> Result<Self> {
        let predicate = condition.bind(child.schema())?;
        Ok(Self {
            child,
            condition,
            predicate,
            opened: false,
            failed: false,
            done: false,
        })
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }
}

impl Filter {
    /// Produce the next tuple; any error aborts the operator.
    fn pull(&mut self) -> Result<Option<Tuple>> {
        if !self.opened {
            return Err(Error::not_open(self.name()));
        }
        if self.done {
            return Ok(None);
        }
        while let Some(tuple) = self.child.next()? {
            if self.predicate.evaluate(&tuple)? {
                return Ok(Some(tuple));
            }
        }
        self.done = true;
        Ok(None)
    }
}

impl Operator for Filter {
    fn open(&mut self) -> Result<()> {
        self.child.open()?;
        self.opened = true;
        self.failed = false;
        self.done = false;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if self.failed {
            return Err(Error::aborted(self.name()));
        }
        let result = self.pull();
        self.failed = self.opened && result.is_err();
        result
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }

    fn schema(&self) -> &[Attribute] {
        self.child.schema()
    }

    fn name(&self) -> &str {
        "Filter"
    }
}
