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

//! Projection operator.

use crate::core::{position_of, Attribute, Error, Result, Tuple, TupleLayout};

use super::config::ExecConfig;
use super::operator::Operator;

/// Re-encodes every child tuple keeping only the requested attributes,
/// in the requested order.
pub struct Project {
    child: Box<dyn Operator>,
    layout: TupleLayout,
    indices: Vec<usize>,
    schema: Vec<Attribute>,
    opened: bool,
    failed: bool,
}

impl Project {
    pub fn new(child: Box<dyn Operator>, attrs: &[&str]) -> Result<Self> {
        Self::with_config(child, attrs, &ExecConfig::default())
    }

    pub fn with_config(child: Box<dyn Operator>, attrs: &[&str], config: &ExecConfig) -> Result<Self> {
        if attrs.is_empty() {
            return Err(Error::invalid_argument("projection needs at least one attribute"));
        }
        let input = child.schema();
        let indices = attrs
            .iter()
            .map(|name| position_of(input, name))
            .collect::<Result<Vec<_>>>()?;
        let schema = indices.iter().map(|&i| input[i].clone()).collect();
        let layout = TupleLayout::new(input).with_max_tuple_size(config.max_tuple_size);
        Ok(Self {
            child,
            layout,
            indices,
            schema,
            opened: false,
            failed: false,
        })
    }
}

impl Project {
    /// Produce the next tuple; any error aborts the operator.
    fn pull(&mut self) -> Result<Option<Tuple>> {
        if !self.opened {
            return Err(Error::not_open(self.name()));
        }
        match self.child.next()? {
            Some(tuple) => Ok(Some(self.layout.project(&tuple, &self.indices)?)),
            None => Ok(None),
        }
    }
}

impl Operator for Project {
    fn open(&mut self) -> Result<()> {
        self.child.open()?;
        self.opened = true;
        self.failed = false;
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
        &self.schema
    }

    fn name(&self) -> &str {
        "Project"
    }
}
