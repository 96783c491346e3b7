use super::{Model, ModelId, Schema};
use crate::{Error, Result, Type};
use std::collections::HashSet;

pub(super) fn verify(schema: &Schema) -> Result<()> {
    for model in schema.models() {
        verify_fields(schema, model)?;
        verify_parent(schema, model)?;
    }
    Ok(())
}

fn verify_fields(schema: &Schema, model: &Model) -> Result<()> {
    let mut names = HashSet::new();

    for field in &model.fields {
        if !names.insert(field.name.as_str()) {
            return Err(Error::invalid_schema(format!(
                "duplicate field `{}` in `{}`",
                field.name, model.name
            )));
        }

        if let Some(missing) = undeclared_model(schema, &field.ty) {
            return Err(Error::invalid_schema(format!(
                "field `{}.{}` refers to undeclared model {missing:?}",
                model.name, field.name
            )));
        }
    }

    Ok(())
}

fn undeclared_model(schema: &Schema, ty: &Type) -> Option<ModelId> {
    match ty {
        Type::Model(id) if !schema.models.contains_key(id) => Some(*id),
        Type::List(inner) | Type::Map(inner) => undeclared_model(schema, inner),
        _ => None,
    }
}

fn verify_parent(schema: &Schema, model: &Model) -> Result<()> {
    let mut seen = HashSet::from([model.id]);
    let mut current = model.parent;

    while let Some(id) = current {
        let Some(parent) = schema.models.get(&id) else {
            return Err(Error::invalid_schema(format!(
                "`{}` extends undeclared model {id:?}",
                model.name
            )));
        };

        if !seen.insert(id) {
            return Err(Error::invalid_schema(format!(
                "inheritance cycle through `{}`",
                model.name
            )));
        }

        current = parent.parent;
    }

    let Some(parent) = model.parent.map(|id| schema.model(id)) else {
        return Ok(());
    };

    // Field indices of the parent must stay valid on the subtype.
    let prefix_ok = parent.fields.len() <= model.fields.len()
        && parent
            .fields
            .iter()
            .zip(&model.fields)
            .all(|(a, b)| a.name == b.name && a.ty == b.ty && a.nullable == b.nullable);

    if !prefix_ok {
        return Err(Error::invalid_schema(format!(
            "`{}` must start with the fields of `{}` in the same order",
            model.name, parent.name
        )));
    }

    Ok(())
}
