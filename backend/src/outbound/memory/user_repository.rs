//! In-memory user repository with the same uniqueness rules as the
//! `users` table.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, PageRequest, User, UserAccount, UserId, Username};

use super::POISONED;

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<HashMap<UserId, UserAccount>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, UserAccount>>, UserRepositoryError> {
        self.accounts
            .lock()
            .map_err(|_| UserRepositoryError::query(POISONED))
    }
}

fn username_taken(
    accounts: &HashMap<UserId, UserAccount>,
    username: &Username,
    except: Option<&UserId>,
) -> bool {
    accounts
        .values()
        .any(|account| account.user.username == *username && Some(&account.user.id) != except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserRepositoryError> {
        let mut accounts = self.lock()?;
        if accounts
            .values()
            .any(|existing| existing.user.email == account.user.email)
        {
            return Err(UserRepositoryError::duplicate_email());
        }
        if username_taken(&accounts, &account.user.username, None) {
            return Err(UserRepositoryError::duplicate_username());
        }
        accounts.insert(account.user.id.clone(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock()?.get(id).map(|account| account.user.clone()))
    }

    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        Ok(self
            .lock()?
            .values()
            .find(|account| account.user.email == *email)
            .cloned())
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserRepositoryError> {
        Ok(self
            .lock()?
            .values()
            .any(|account| account.user.email == *email))
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError> {
        Ok(username_taken(&*self.lock()?, username, None))
    }

    async fn list_active(&self, page: PageRequest) -> Result<Vec<User>, UserRepositoryError> {
        let accounts = self.lock()?;
        let mut active: Vec<&User> = accounts
            .values()
            .map(|account| &account.user)
            .filter(|user| user.is_active)
            .collect();
        active.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        Ok(page.window(active.into_iter().cloned()))
    }

    async fn update(&self, user: &User) -> Result<Option<User>, UserRepositoryError> {
        let mut accounts = self.lock()?;
        if username_taken(&accounts, &user.username, Some(&user.id)) {
            return Err(UserRepositoryError::duplicate_username());
        }
        let Some(account) = accounts.get_mut(&user.id) else {
            return Ok(None);
        };
        account.user.username = user.username.clone();
        account.user.full_name = user.full_name.clone();
        account.user.profile = user.profile.clone();
        account.user.updated_at = user.updated_at;
        Ok(Some(account.user.clone()))
    }
}
