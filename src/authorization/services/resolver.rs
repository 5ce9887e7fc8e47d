//! Maps a task and a role rule to the users the rule admits.

use crate::authorization::domain::TaskContext;
use crate::config::EngineConfig;
use crate::directory::{
    domain::{DepartmentId, DirectoryUser, RoleId, UserId},
    ports::{DirectoryResult, OrgDirectory},
};
use crate::process::domain::{ActionId, ProcessDefinition, RoleRule, RoleType};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Side-effect free permission resolver.
///
/// Resolution only reads the directory, so the same task, rule and directory
/// contents always produce the same set.
#[derive(Clone)]
pub struct PermissionResolver<D>
where
    D: OrgDirectory,
{
    directory: Arc<D>,
    head_role_pattern: String,
    max_supervisor_hops: usize,
}

impl<D> PermissionResolver<D>
where
    D: OrgDirectory,
{
    /// Creates a resolver reading `directory`.
    #[must_use]
    pub fn new(directory: Arc<D>, config: &EngineConfig) -> Self {
        Self {
            directory,
            head_role_pattern: config.department_head_role_pattern.clone(),
            max_supervisor_hops: config.max_supervisor_hops,
        }
    }

    /// Returns the users `rule` admits for the task.
    ///
    /// # Errors
    ///
    /// Returns a directory error when a lookup fails. Missing users, roles
    /// or departments resolve to an empty set instead.
    pub async fn resolve(
        &self,
        context: &TaskContext,
        rule: RoleRule,
    ) -> DirectoryResult<BTreeSet<UserId>> {
        match rule {
            RoleRule::Requestor => Ok(Self::requestor(context)),
            RoleRule::RequestorManager => self.requestor_manager(context).await,
            RoleRule::RequestorDepartmentHead => self.requestor_department_head(context).await,
            RoleRule::SpecificDepartmentHead { department } => {
                self.specific_department_head(department).await
            }
            RoleRule::Assignee => Ok(Self::assignees(context)),
            RoleRule::SpecificUser { user } => Ok(Self::specific_user(user)),
            RoleRule::SpecificRole { role } => self.specific_role(role).await,
            RoleRule::SpecificDepartment { department } => {
                self.specific_department(department).await
            }
            RoleRule::SpecificRoleAndDepartment { role, department } => {
                self.specific_role_and_department(role, department).await
            }
        }
    }

    /// Unions [`Self::resolve`] over every rule governing `action`.
    ///
    /// A user admitted by several rules appears once per rule category.
    ///
    /// # Errors
    ///
    /// Returns a directory error when a lookup fails.
    pub async fn resolve_for_action(
        &self,
        context: &TaskContext,
        definition: &ProcessDefinition,
        action: ActionId,
    ) -> DirectoryResult<BTreeSet<(UserId, RoleType)>> {
        let mut resolved = BTreeSet::new();
        for role in definition.rules_for(action) {
            let rule = role.rule();
            let users = self.resolve(context, rule).await?;
            debug!(
                task_id = %context.task_id,
                action_id = %action,
                role_type = %rule.role_type(),
                users = users.len(),
                "role rule resolved"
            );
            resolved.extend(users.into_iter().map(|user| (user, rule.role_type())));
        }
        Ok(resolved)
    }

    fn requestor(context: &TaskContext) -> BTreeSet<UserId> {
        BTreeSet::from([context.created_by])
    }

    async fn requestor_manager(&self, context: &TaskContext) -> DirectoryResult<BTreeSet<UserId>> {
        let manager = self.active_supervisor_of(context.created_by).await?;
        Ok(manager.into_iter().collect())
    }

    async fn requestor_department_head(
        &self,
        context: &TaskContext,
    ) -> DirectoryResult<BTreeSet<UserId>> {
        let Some(requestor) = self.directory.find_user(context.created_by).await? else {
            return Ok(BTreeSet::new());
        };
        let Some(department) = requestor.department() else {
            return Ok(BTreeSet::new());
        };
        self.specific_department_head(department).await
    }

    async fn specific_department_head(
        &self,
        department: DepartmentId,
    ) -> DirectoryResult<BTreeSet<UserId>> {
        let head = self.head_of(department).await?;
        Ok(head.into_iter().collect())
    }

    fn assignees(context: &TaskContext) -> BTreeSet<UserId> {
        context.assignees.clone()
    }

    fn specific_user(user: UserId) -> BTreeSet<UserId> {
        BTreeSet::from([user])
    }

    async fn specific_role(&self, role: RoleId) -> DirectoryResult<BTreeSet<UserId>> {
        let holders = self.directory.active_users_with_role(role).await?;
        Ok(holders.iter().map(DirectoryUser::id).collect())
    }

    async fn specific_department(
        &self,
        department: DepartmentId,
    ) -> DirectoryResult<BTreeSet<UserId>> {
        let members = self.directory.active_users_in_department(department).await?;
        Ok(members.iter().map(DirectoryUser::id).collect())
    }

    async fn specific_role_and_department(
        &self,
        role: RoleId,
        department: DepartmentId,
    ) -> DirectoryResult<BTreeSet<UserId>> {
        let holders = self.specific_role(role).await?;
        let members = self.specific_department(department).await?;
        Ok(holders.intersection(&members).copied().collect())
    }

    /// Finds the active member of `department` whose role name contains the
    /// configured pattern; the lowest username wins ties.
    async fn head_of(&self, department: DepartmentId) -> DirectoryResult<Option<UserId>> {
        let members = self.directory.active_users_in_department(department).await?;
        let mut head: Option<DirectoryUser> = None;
        for member in members {
            let Some(role_id) = member.role() else {
                continue;
            };
            let Some(role) = self.directory.find_role(role_id).await? else {
                continue;
            };
            if !role.name_matches(&self.head_role_pattern) {
                continue;
            }
            let replaces = head
                .as_ref()
                .is_none_or(|current| member.username() < current.username());
            if replaces {
                head = Some(member);
            }
        }
        Ok(head.as_ref().map(DirectoryUser::id))
    }

    /// Walks up the supervisor chain until an active supervisor is found.
    ///
    /// The walk stops after the configured number of hops or when it meets
    /// a user it has already visited.
    async fn active_supervisor_of(&self, user: UserId) -> DirectoryResult<Option<UserId>> {
        let mut visited = BTreeSet::from([user]);
        let mut current = user;
        for _ in 0..self.max_supervisor_hops {
            let Some(subordinate) = self.directory.find_user(current).await? else {
                return Ok(None);
            };
            let Some(supervisor_id) = subordinate.supervisor() else {
                return Ok(None);
            };
            if !visited.insert(supervisor_id) {
                return Ok(None);
            }
            let Some(supervisor) = self.directory.find_user(supervisor_id).await? else {
                return Ok(None);
            };
            if supervisor.is_active() {
                return Ok(Some(supervisor_id));
            }
            current = supervisor_id;
        }
        Ok(None)
    }
}
