use quiver_db::{Condition, Fluent, Order, QueryBuilder, Value};

use crate::{
    cli::FilterArgs,
    error::{CliError, CliResult},
    utils::{parse_literal, split_pair},
};

impl FilterArgs {
    /// Builds the conditions, grouped by operator.
    pub fn conditions(&self) -> CliResult<Vec<Condition>> {
        let mut conditions = Vec::new();

        let scalar: [(&[String], fn(&str, Value) -> Condition); 6] = [
            (self.eq.as_slice(), |c, v| Condition::eq(c, v)),
            (self.neq.as_slice(), |c, v| Condition::neq(c, v)),
            (self.lt.as_slice(), |c, v| Condition::lt(c, v)),
            (self.lte.as_slice(), |c, v| Condition::lte(c, v)),
            (self.gt.as_slice(), |c, v| Condition::gt(c, v)),
            (self.gte.as_slice(), |c, v| Condition::gte(c, v)),
        ];
        for (raws, make) in scalar {
            for raw in raws {
                let (column, value) = split_pair(raw)?;
                conditions.push(make(column, parse_literal(value)));
            }
        }

        for raw in &self.like {
            let (column, pattern) = split_pair(raw)?;
            conditions.push(Condition::like(column, pattern));
        }
        for raw in &self.not_like {
            let (column, pattern) = split_pair(raw)?;
            conditions.push(Condition::not_like(column, pattern));
        }

        for raw in &self.in_ {
            let (column, values) = split_pair(raw)?;
            conditions.push(Condition::in_list(column, split_list(values))?);
        }
        for raw in &self.not_in {
            let (column, values) = split_pair(raw)?;
            conditions.push(Condition::not_in_list(column, split_list(values))?);
        }

        conditions.extend(self.is_null.iter().map(Condition::is_null));
        conditions.extend(self.not_null.iter().map(Condition::not_null));

        Ok(conditions)
    }

    /// Sort keys in the order they were given.
    pub fn orders(&self) -> CliResult<Vec<(&str, Order)>> {
        self.order.iter().map(|raw| parse_order(raw)).collect()
    }

    pub fn apply_to_builder(&self, builder: &mut QueryBuilder) -> CliResult<()> {
        for condition in self.conditions()? {
            builder.add_where(condition);
        }
        for (column, order) in self.orders()? {
            builder.push_order(column, order);
        }
        if let Some(limit) = self.limit {
            builder.set_limit(limit);
        }
        if let Some(offset) = self.offset {
            builder.set_offset(offset);
        }
        Ok(())
    }

    pub fn apply_to_model<M: Fluent>(&self, model: &mut M) -> CliResult<()> {
        self.apply_to_builder(model.query_builder())
    }
}

/// Reads `column` or `column:direction`, the direction in any case.
fn parse_order(raw: &str) -> CliResult<(&str, Order)> {
    let (column, order) = match raw.rsplit_once(':') {
        Some((column, direction)) => (column, direction.to_ascii_uppercase().parse()?),
        None => (raw, Order::Asc),
    };
    let column = column.trim();
    if column.is_empty() {
        return Err(CliError::InvalidFilter(raw.to_string()));
    }
    Ok((column, order))
}

fn split_list(values: &str) -> Vec<Value> {
    values
        .split(',')
        .filter(|value| !value.is_empty())
        .map(parse_literal)
        .collect()
}
