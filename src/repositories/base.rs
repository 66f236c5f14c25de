//! Generic filtered repository
//!
//! [`Repository`] exposes CRUD, upsert, count and pagination over any SeaORM
//! entity. It borrows a connection (a pool handle or an open transaction)
//! and owns the [`RecordDescriptor`] for its record type; it holds no other
//! state. Every operation issues a single statement, except `delete`, which
//! looks the record up before removing it by primary key.
//!
//! Inserts and updates that return rows are built as `... RETURNING *`
//! statements, so the backing engine must support `RETURNING` (Postgres,
//! SQLite 3.35+).

use sea_orm::sea_query::{
    Alias, Asterisk, Expr, Func, InsertStatement, NullOrdering, OnConflict,
    Order, Query, SimpleExpr, UpdateStatement, WindowStatement,
};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, IdenStatic,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select,
    StatementBuilder,
};

use super::descriptor::RecordDescriptor;
use super::filter::{Filters, condition};
use super::values::FieldValues;
use crate::error::RepositoryError;

const TOTAL_COUNT: &str = "total_count";

/// One page of records plus the number of records matching the filter
/// regardless of pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<M> {
    pub items: Vec<M>,
    pub total: u64,
}

impl<M> Page<M> {
    pub fn into_parts(self) -> (Vec<M>, u64) {
        (self.items, self.total)
    }
}

/// Filtered data access for one record type over a borrowed connection.
pub struct Repository<'a, E: EntityTrait, C: ConnectionTrait> {
    conn: &'a C,
    descriptor: RecordDescriptor<E>,
}

impl<'a, E, C> Repository<'a, E, C>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    pub fn new(conn: &'a C, descriptor: RecordDescriptor<E>) -> Self {
        Self { conn, descriptor }
    }

    pub fn descriptor(&self) -> &RecordDescriptor<E> {
        &self.descriptor
    }

    /// First record matching `filters`, if any.
    pub async fn get(&self, filters: &Filters) -> Result<Option<E::Model>, RepositoryError> {
        let condition = condition(&self.descriptor, filters)?;
        Ok(E::find().filter(condition).one(self.conn).await?)
    }

    /// One page of matching records and the total match count, fetched in a
    /// single query through a `COUNT(*) OVER ()` window column.
    ///
    /// An empty page reports a total of zero: with no rows returned there is
    /// nothing to carry the window count.
    pub async fn get_multi(
        &self,
        offset: u64,
        limit: u64,
        order_by: Option<&str>,
        filters: &Filters,
    ) -> Result<Page<E::Model>, RepositoryError> {
        if limit == 0 {
            return Err(RepositoryError::validation_error(
                "limit must be greater than zero",
            ));
        }

        let condition = condition(&self.descriptor, filters)?;
        let mut select = self
            .ordered(E::find().filter(condition), order_by)?
            .offset(offset)
            .limit(limit);
        QueryTrait::query(&mut select).expr_window_as(
            Func::count(Expr::col(Asterisk)),
            WindowStatement::new(),
            Alias::new(TOTAL_COUNT),
        );

        let statement = select.build(self.conn.get_database_backend());
        let rows = self.conn.query_all(statement).await?;

        let total = match rows.first() {
            Some(row) => row.try_get::<i64>("", TOTAL_COUNT)?.max(0) as u64,
            None => 0,
        };
        let items = rows
            .iter()
            .map(|row| E::Model::from_query_result(row, ""))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            record = self.descriptor.name(),
            offset,
            limit,
            returned = items.len(),
            total,
            "Fetched page"
        );

        Ok(Page { items, total })
    }

    /// Every matching record, optionally ordered. Unbounded.
    pub async fn get_multi_without_pagination(
        &self,
        order_by: Option<&str>,
        filters: &Filters,
    ) -> Result<Vec<E::Model>, RepositoryError> {
        let condition = condition(&self.descriptor, filters)?;
        Ok(self
            .ordered(E::find().filter(condition), order_by)?
            .all(self.conn)
            .await?)
    }

    /// Inserts one record and returns it as stored.
    ///
    /// Fails with `AlreadyExists` when the row violates a uniqueness
    /// constraint; nothing is written in that case.
    pub async fn create(&self, values: FieldValues) -> Result<E::Model, RepositoryError> {
        let mut insert = self.insert_statement(std::slice::from_ref(&values))?;
        insert.returning_all();

        let statement = self.conn.get_database_backend().build(&insert);
        let created = E::find()
            .from_raw_sql(statement)
            .one(self.conn)
            .await
            .map_err(|err| self.write_error(err, &values))?;

        created.ok_or_else(|| RepositoryError::Database(sea_orm::DbErr::RecordNotInserted))
    }

    /// Bulk insert that silently skips rows conflicting with existing ones.
    ///
    /// Rows dropped on conflict are not reported. All rows must set the same
    /// fields.
    pub async fn create_many(&self, rows: Vec<FieldValues>) -> Result<(), RepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut insert = self.insert_statement(&rows)?;
        insert.on_conflict(OnConflict::new().do_nothing().to_owned());

        let result = self
            .execute_write(&insert, || batch_input(&rows))
            .await?;

        tracing::debug!(
            record = self.descriptor.name(),
            submitted = rows.len(),
            inserted = result,
            "Bulk insert finished"
        );
        Ok(())
    }

    /// Inserts a record or, when it conflicts on `conflict_fields`,
    /// overwrites the `update_fields` present in `values`.
    pub async fn create_or_update<S: AsRef<str>>(
        &self,
        values: FieldValues,
        conflict_fields: &[S],
        update_fields: &[S],
    ) -> Result<(), RepositoryError> {
        let conflict = self.descriptor.conflict_target(conflict_fields)?;
        let present: Vec<&str> = update_fields
            .iter()
            .map(|field| field.as_ref())
            .filter(|field| values.contains(field))
            .collect();
        let updates = self.descriptor.resolve_all(&present)?;

        let mut insert = self.insert_statement(std::slice::from_ref(&values))?;
        insert.on_conflict(on_conflict(conflict, updates));

        self.execute_write(&insert, || values.to_string()).await?;
        Ok(())
    }

    /// Batch form of [`Repository::create_or_update`]; every listed update
    /// field is overwritten on conflict.
    pub async fn create_many_or_update<S: AsRef<str>>(
        &self,
        rows: Vec<FieldValues>,
        conflict_fields: &[S],
        update_fields: &[S],
    ) -> Result<(), RepositoryError> {
        let conflict = self.descriptor.conflict_target(conflict_fields)?;
        let updates = self.descriptor.resolve_all(update_fields)?;
        if rows.is_empty() {
            return Ok(());
        }

        let mut insert = self.insert_statement(&rows)?;
        insert.on_conflict(on_conflict(conflict, updates));

        let affected = self.execute_write(&insert, || batch_input(&rows)).await?;
        tracing::debug!(
            record = self.descriptor.name(),
            submitted = rows.len(),
            affected,
            "Bulk upsert finished"
        );
        Ok(())
    }

    /// Applies `updates` to every record matching `filters` and returns the
    /// first updated record.
    ///
    /// Fails with `NotFound` when nothing matched and with `AlreadyExists`
    /// when the new values violate a uniqueness constraint.
    pub async fn update(
        &self,
        filters: &Filters,
        updates: FieldValues,
    ) -> Result<E::Model, RepositoryError> {
        let mut update = self.update_statement(filters, &updates)?;
        update.returning_all();

        let statement = self.conn.get_database_backend().build(&update);
        let mut updated = E::find()
            .from_raw_sql(statement)
            .all(self.conn)
            .await
            .map_err(|err| self.write_error(err, &updates))?;

        if updated.is_empty() {
            return Err(self.not_found(filters));
        }
        Ok(updated.swap_remove(0))
    }

    /// Applies `updates` to every record matching `filters`; returns the
    /// number of rows changed, which may be zero.
    pub async fn update_many(
        &self,
        filters: &Filters,
        updates: FieldValues,
    ) -> Result<u64, RepositoryError> {
        let update = self.update_statement(filters, &updates)?;
        let affected = self
            .execute_write(&update, || updates.to_string())
            .await?;

        tracing::debug!(
            record = self.descriptor.name(),
            affected,
            "Bulk update finished"
        );
        Ok(affected)
    }

    /// Deletes the first record matching `filters`, identified by its
    /// primary key. Fails with `NotFound` when nothing matched.
    pub async fn delete(&self, filters: &Filters) -> Result<(), RepositoryError> {
        let condition = condition(&self.descriptor, filters)?;
        let record = E::find()
            .filter(condition)
            .one(self.conn)
            .await?
            .ok_or_else(|| self.not_found(filters))?;

        let identity = self
            .descriptor
            .primary_key()
            .iter()
            .fold(Condition::all(), |identity, column| {
                identity.add(column.eq(record.get(*column)))
            });
        E::delete_many().filter(identity).exec(self.conn).await?;
        Ok(())
    }

    /// Deletes every record matching `filters`; no match is not an error.
    pub async fn delete_many(&self, filters: &Filters) -> Result<(), RepositoryError> {
        let condition = condition(&self.descriptor, filters)?;
        let result = E::delete_many().filter(condition).exec(self.conn).await?;

        tracing::debug!(
            record = self.descriptor.name(),
            affected = result.rows_affected,
            "Bulk delete finished"
        );
        Ok(())
    }

    /// Inserts `values`, or on conflict over `index_fields` overwrites every
    /// other field the payload sets.
    pub async fn upsert<S: AsRef<str>>(
        &self,
        values: FieldValues,
        index_fields: &[S],
    ) -> Result<(), RepositoryError> {
        let conflict = self.descriptor.conflict_target(index_fields)?;
        let present: Vec<&str> = values
            .keys()
            .filter(|field| !index_fields.iter().any(|index| index.as_ref() == *field))
            .collect();
        let updates = self.descriptor.resolve_all(&present)?;

        let mut insert = self.insert_statement(std::slice::from_ref(&values))?;
        insert.on_conflict(on_conflict(conflict, updates));

        self.execute_write(&insert, || values.to_string()).await?;
        Ok(())
    }

    /// Number of records matching `filters`.
    pub async fn count(&self, filters: &Filters) -> Result<u64, RepositoryError> {
        let condition = condition(&self.descriptor, filters)?;
        Ok(E::find().filter(condition).count(self.conn).await?)
    }

    fn ordered(
        &self,
        select: Select<E>,
        order_by: Option<&str>,
    ) -> Result<Select<E>, RepositoryError> {
        let Some(order_by) = order_by else {
            return Ok(select);
        };

        let select = match order_by.strip_prefix('-') {
            Some(field) => {
                let column = self.descriptor.resolve(field)?;
                select.order_by_with_nulls(column, Order::Desc, NullOrdering::Last)
            }
            None => {
                let column = self.descriptor.resolve(order_by)?;
                select.order_by_asc(column)
            }
        };
        Ok(select)
    }

    /// Builds a multi-row insert, filling descriptor defaults the rows omit.
    fn insert_statement(&self, rows: &[FieldValues]) -> Result<InsertStatement, RepositoryError> {
        let rows: Vec<FieldValues> = rows.iter().map(|row| self.with_defaults(row)).collect();
        let Some(first) = rows.first() else {
            return Err(RepositoryError::validation_error("no rows to insert"));
        };

        let fields: Vec<&str> = first.keys().collect();
        if fields.is_empty() {
            return Err(RepositoryError::validation_error("insert sets no fields"));
        }
        let columns = self.descriptor.resolve_all(&fields)?;

        let mut insert = Query::insert();
        insert
            .into_table(E::default().table_ref())
            .columns(columns);

        for (index, row) in rows.iter().enumerate() {
            if row.len() != fields.len() {
                return Err(mismatched_row(index));
            }
            let exprs = fields
                .iter()
                .map(|field| {
                    row.get(field)
                        .map(|value| SimpleExpr::Value(value.clone()))
                        .ok_or_else(|| mismatched_row(index))
                })
                .collect::<Result<Vec<_>, _>>()?;
            insert
                .values(exprs)
                .map_err(|err| RepositoryError::validation_error(err.to_string()))?;
        }

        Ok(insert)
    }

    fn update_statement(
        &self,
        filters: &Filters,
        updates: &FieldValues,
    ) -> Result<UpdateStatement, RepositoryError> {
        if updates.is_empty() {
            return Err(RepositoryError::validation_error("update sets no fields"));
        }

        let condition = condition(&self.descriptor, filters)?;
        let assignments = updates
            .iter()
            .map(|(field, value)| {
                self.descriptor
                    .resolve(field)
                    .map(|column| (column, SimpleExpr::Value(value.clone())))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut update = Query::update();
        update
            .table(E::default().table_ref())
            .values(assignments)
            .cond_where(condition);
        Ok(update)
    }

    fn with_defaults(&self, row: &FieldValues) -> FieldValues {
        let mut row = row.clone();
        for (field, value) in self.descriptor.defaults() {
            if !row.contains(&field) {
                row.insert(field, value);
            }
        }
        row
    }

    async fn execute_write<S, F>(&self, statement: &S, input: F) -> Result<u64, RepositoryError>
    where
        S: StatementBuilder,
        F: FnOnce() -> String,
    {
        let statement = self.conn.get_database_backend().build(statement);
        match self.conn.execute(statement).await {
            Ok(result) => Ok(result.rows_affected()),
            Err(err) => Err(RepositoryError::from_write_error(
                err,
                self.descriptor.name(),
                input(),
            )),
        }
    }

    fn write_error(&self, err: sea_orm::DbErr, input: &FieldValues) -> RepositoryError {
        RepositoryError::from_write_error(err, self.descriptor.name(), input.to_string())
    }

    fn not_found(&self, filters: &Filters) -> RepositoryError {
        RepositoryError::NotFound {
            record: self.descriptor.name(),
            filters: filters.to_string(),
        }
    }
}

fn on_conflict<T: IdenStatic>(conflict: Vec<T>, updates: Vec<T>) -> OnConflict {
    let mut on_conflict = OnConflict::columns(conflict);
    if updates.is_empty() {
        on_conflict.do_nothing();
    } else {
        on_conflict.update_columns(updates);
    }
    on_conflict
}

fn batch_input(rows: &[FieldValues]) -> String {
    rows.iter()
        .map(|row| format!("{{{row}}}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn mismatched_row(index: usize) -> RepositoryError {
    RepositoryError::validation_error(format!(
        "row {index} does not set the same fields as the first row"
    ))
}
