//! The employee record schema used by the command line tool.
//!
//! ```xml
//! <Employee>
//!     <name>Bob</name>
//!     <homeAddress>
//!         <street>Some Street</street>
//!         <city>Some City</city>
//!         <state>Some State</state>
//!     </homeAddress>
//!     <age>21</age>
//! </Employee>
//! ```

use crate::formatting::FormattingMode;
use crate::reflect::{FieldInfo, Reflect, SequenceValue, Target};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
}

impl Address {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("street", 0, FormattingMode::DEFAULT),
        FieldInfo::new("city", 1, FormattingMode::DEFAULT),
        FieldInfo::new("state", 2, FormattingMode::DEFAULT),
    ];
}

impl SequenceValue for Address {
    fn fields(&self) -> &'static [FieldInfo] {
        Self::FIELDS
    }

    fn field_mut(&mut self, id: i32) -> Option<&mut dyn Reflect> {
        match id {
            0 => Some(&mut self.street),
            1 => Some(&mut self.city),
            2 => Some(&mut self.state),
            _ => None,
        }
    }
}

impl Reflect for Address {
    fn target(&mut self) -> Target<'_> {
        Target::Sequence(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Employee {
    pub name: String,
    /// `None` for `<homeAddress/>`.
    pub home_address: Option<Address>,
    pub age: i32,
}

impl Employee {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::new("name", 0, FormattingMode::DEFAULT),
        FieldInfo::new("homeAddress", 1, FormattingMode::NILLABLE),
        FieldInfo::new("age", 2, FormattingMode::DEFAULT),
    ];
}

impl SequenceValue for Employee {
    fn fields(&self) -> &'static [FieldInfo] {
        Self::FIELDS
    }

    fn field_mut(&mut self, id: i32) -> Option<&mut dyn Reflect> {
        match id {
            0 => Some(&mut self.name),
            1 => Some(&mut self.home_address),
            2 => Some(&mut self.age),
            _ => None,
        }
    }
}

impl Reflect for Employee {
    fn target(&mut self) -> Target<'_> {
        Target::Sequence(self)
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name)?;
        match &self.home_address {
            Some(address) => {
                writeln!(f, "homeAddress:")?;
                writeln!(f, "  street: {}", address.street)?;
                writeln!(f, "  city: {}", address.city)?;
                writeln!(f, "  state: {}", address.state)?;
            }
            None => writeln!(f, "homeAddress: nil")?,
        }
        write!(f, "age: {}", self.age)
    }
}
