use rowmap_core::{
    schema::{ModelId, Step},
    setter::PropertySetter,
    Error, Result, Value, ValueRecord,
};

/// How an object node creates its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Instantiation {
    /// No constructor: start from an all-null record and assign in place
    Direct,

    /// Collect the constructor arguments, construct once, then run the
    /// remaining assignments
    Deferred { params: Vec<Param> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Param {
    pub(crate) field: usize,
    pub(crate) name: String,
    pub(crate) nullable: bool,
}

/// Accumulates the values of one object before it is built.
pub(crate) struct GenericBuilder<'a> {
    model_name: &'a str,
    instantiation: &'a Instantiation,
    record: ValueRecord,

    /// Per constructor parameter, whether an argument arrived
    delivered: Vec<bool>,

    /// Assignments waiting for construction
    pending: Vec<Assignment<'a>>,
}

enum Assignment<'a> {
    Slot(&'a [Step], Value),
    Custom(&'a PropertySetter, Value),
}

impl Instantiation {
    fn param_position(&self, field: usize) -> Option<usize> {
        match self {
            Instantiation::Direct => None,
            Instantiation::Deferred { params } => {
                params.iter().position(|param| param.field == field)
            }
        }
    }
}

impl<'a> GenericBuilder<'a> {
    pub(crate) fn new(
        model: ModelId,
        model_name: &'a str,
        len: usize,
        instantiation: &'a Instantiation,
    ) -> GenericBuilder<'a> {
        let params = match instantiation {
            Instantiation::Direct => 0,
            Instantiation::Deferred { params } => params.len(),
        };

        GenericBuilder {
            model_name,
            instantiation,
            record: ValueRecord::new(model, len),
            delivered: vec![false; params],
            pending: vec![],
        }
    }

    /// Stores `value` at `slot`, or queues it until construction.
    pub(crate) fn deliver(&mut self, slot: &'a [Step], value: Value) -> Result<()> {
        match self.argument(slot) {
            Some(position) => {
                self.delivered[position] = true;
                self.record.assign(slot, value)
            }
            None if self.is_direct() => self.record.assign(slot, value),
            None => {
                self.pending.push(Assignment::Slot(slot, value));
                Ok(())
            }
        }
    }

    /// Hands `value` to a user setter for the property rooted at `slot`.
    pub(crate) fn deliver_with(
        &mut self,
        slot: &'a [Step],
        setter: &'a PropertySetter,
        value: Value,
    ) -> Result<()> {
        match self.argument(slot) {
            Some(position) => {
                self.delivered[position] = true;
                setter.set(&mut self.record, value)
            }
            None if self.is_direct() => setter.set(&mut self.record, value),
            None => {
                self.pending.push(Assignment::Custom(setter, value));
                Ok(())
            }
        }
    }

    /// Constructs the record and applies queued assignments in arrival
    /// order.
    pub(crate) fn build(self) -> Result<ValueRecord> {
        let GenericBuilder {
            model_name,
            instantiation,
            mut record,
            delivered,
            pending,
        } = self;

        if let Instantiation::Deferred { params } = instantiation {
            for (param, delivered) in params.iter().zip(&delivered) {
                if !delivered && !param.nullable {
                    return Err(Error::missing_constructor_argument(model_name, &param.name));
                }
            }
        }

        for assignment in pending {
            match assignment {
                Assignment::Slot(slot, value) => record.assign(slot, value)?,
                Assignment::Custom(setter, value) => setter.set(&mut record, value)?,
            }
        }

        Ok(record)
    }

    fn is_direct(&self) -> bool {
        matches!(self.instantiation, Instantiation::Direct)
    }

    fn argument(&self, slot: &[Step]) -> Option<usize> {
        match slot.first() {
            Some(Step::Field(field)) => self.instantiation.param_position(*field),
            _ => None,
        }
    }
}
