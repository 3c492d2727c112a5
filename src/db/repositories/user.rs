use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    SqlErr, TransactionTrait,
};
use tracing::debug;

use crate::db::StoreError;
use crate::entities::{prelude::*, user_groups, user_states, users};
use crate::models::{
    GroupCode, Includes, StatusCode, User, UserFilter, UserGroup, UserRecord, UserState,
};

impl TryFrom<user_groups::Model> for UserGroup {
    type Error = StoreError;

    fn try_from(model: user_groups::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            code: model.code.parse::<GroupCode>().map_err(StoreError::Decode)?,
            description: model.description,
            user_id: model.user_id,
        })
    }
}

impl TryFrom<user_states::Model> for UserState {
    type Error = StoreError;

    fn try_from(model: user_states::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            code: model.code.parse::<StatusCode>().map_err(StoreError::Decode)?,
            description: model.description,
            user_id: model.user_id,
        })
    }
}

fn map_user(
    model: users::Model,
    group: Option<user_groups::Model>,
    state: Option<user_states::Model>,
) -> Result<User, StoreError> {
    Ok(User {
        id: model.id,
        login: model.login,
        password: model.password,
        created_at: model.created_at,
        group: group.map(UserGroup::try_from).transpose()?,
        state: state.map(UserState::try_from).transpose()?,
    })
}

fn filter_condition(filter: &UserFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(id) = filter.id {
        condition = condition.add(users::Column::Id.eq(id));
    }
    if let Some(login) = &filter.login {
        condition = condition.add(users::Column::Login.eq(login.as_str()));
    }
    if let Some(group) = filter.group {
        condition = condition.add(user_groups::Column::Code.eq(group.as_str()));
    }
    if let Some(state) = filter.state {
        condition = condition.add(user_states::Column::Code.eq(state.as_str()));
    }

    condition
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts the user row together with its group and state rows in one
    /// transaction.
    pub async fn insert(&self, record: &UserRecord) -> Result<User, StoreError> {
        let txn = self.conn.begin().await?;

        let user = users::ActiveModel {
            login: Set(record.login.clone()),
            password: Set(record.password.clone()),
            created_at: Set(record.created_at),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                StoreError::DuplicateLogin(record.login.clone())
            }
            _ => StoreError::Database(e),
        })?;

        let group = user_groups::ActiveModel {
            code: Set(record.group.as_str().to_string()),
            description: Set(record.group_description.clone()),
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let state = user_states::ActiveModel {
            code: Set(record.state.as_str().to_string()),
            description: Set(record.state_description.clone()),
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        debug!(user_id = user.id, login = %user.login, "Inserted user");
        map_user(user, Some(group), Some(state))
    }

    pub async fn exists_with_login(&self, login: &str) -> Result<bool, StoreError> {
        let count = Users::find()
            .filter(users::Column::Login.eq(login))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn exists_in_group(&self, group: GroupCode) -> Result<bool, StoreError> {
        let count = UserGroups::find()
            .filter(user_groups::Column::Code.eq(group.as_str()))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn find_state(&self, user_id: i32) -> Result<Option<UserState>, StoreError> {
        UserStates::find()
            .filter(user_states::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?
            .map(UserState::try_from)
            .transpose()
    }

    pub async fn update_state(&self, state: &UserState) -> Result<(), StoreError> {
        user_states::ActiveModel {
            id: Set(state.id),
            code: Set(state.code.as_str().to_string()),
            description: Set(state.description.clone()),
            user_id: Set(state.user_id),
        }
        .update(&self.conn)
        .await?;

        Ok(())
    }

    /// Users matching `filter`, ordered by id, after skipping `skip` rows and
    /// keeping at most `take`.
    pub async fn query(
        &self,
        filter: Option<&UserFilter>,
        skip: u64,
        take: u64,
        includes: Includes,
    ) -> Result<Vec<User>, StoreError> {
        let mut query = Users::find();

        if let Some(filter) = filter {
            if filter.group.is_some() {
                query = query.join(JoinType::InnerJoin, users::Relation::UserGroup.def());
            }
            if filter.state.is_some() {
                query = query.join(JoinType::InnerJoin, users::Relation::UserState.def());
            }
            query = query.filter(filter_condition(filter));
        }

        let rows = query
            .order_by_asc(users::Column::Id)
            .offset(skip)
            .limit(take)
            .all(&self.conn)
            .await?;

        let groups = if includes.group {
            rows.load_one(UserGroups, &self.conn).await?
        } else {
            vec![None; rows.len()]
        };

        let states = if includes.state {
            rows.load_one(UserStates, &self.conn).await?
        } else {
            vec![None; rows.len()]
        };

        rows.into_iter()
            .zip(groups)
            .zip(states)
            .map(|((user, group), state)| map_user(user, group, state))
            .collect()
    }
}
