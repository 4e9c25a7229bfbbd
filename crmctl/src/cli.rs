//! Command-line front end.
//!
//! Each subcommand behaves like a page visit in the browser console: it
//! first navigates through the guard, then drives the API (list commands go
//! through the [`ListController`]). A redirected navigation prints where the
//! console ended up and runs nothing.

use crate::api::endpoints::{customers, dashboard, roles, users};
use crate::api::models::customers::CustomerCreate;
use crate::auth::{LoginForm, RegisterForm};
use crate::console::Console;
use crate::errors::Result;
use crate::guard::GuardOutcome;
use crate::list::{ListController, ListOptions, SearchForm};
use crate::notify::TracingNotifier;
use crate::routes;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub args: crate::config::Args,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in with username and password
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log out and clear the persisted session
    Logout,
    /// Show the current session
    Whoami,
    /// Customer management
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// User management
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Role management
    Roles {
        #[command(subcommand)]
        action: RoleAction,
    },
    /// Enumerate customer status values
    Statuses,
    /// Show dashboard metrics
    Dashboard,
}

/// Shared search/pagination flags for list subcommands.
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search filter as field=value (serialized field names); repeatable
    #[arg(long = "filter", value_parser = parse_key_val)]
    pub filters: Vec<(String, String)>,

    /// Page to show (1-based)
    #[arg(long)]
    pub page: Option<usize>,

    /// Items per page
    #[arg(long)]
    pub page_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum CustomerAction {
    /// List customers
    List(ListArgs),
    /// Create a customer
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        status: String,
        #[arg(long)]
        address: Option<String>,
    },
    /// Replace a customer record
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        status: String,
        #[arg(long)]
        address: Option<String>,
    },
    /// Delete a customer
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// List users
    List(ListArgs),
    /// Register a new user
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete a user
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum RoleAction {
    /// List roles
    List(ListArgs),
    /// Create a role
    Create {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        /// Permission tag; repeatable
        #[arg(long = "permission")]
        permissions: Vec<String>,
    },
    /// Delete a role
    Delete { id: i64 },
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid filter {s:?}, expected field=value"))
}

pub async fn run(command: Command, console: &mut Console) -> Result<()> {
    let result = dispatch(command, console).await;
    if let Err(e) = &result {
        console.handle_error(e);
    }
    result
}

async fn dispatch(command: Command, console: &mut Console) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            console.login(&LoginForm { username, password }).await?;
            if let Some(user) = console.session().user_info() {
                println!("Logged in as {} ({})", user.username, user.role);
            }
            Ok(())
        }
        Command::Logout => console.logout(),
        Command::Whoami => {
            if !enter(console, "/profile") {
                return Ok(());
            }
            match console.session().user_info() {
                Some(user) => {
                    println!("{}", serde_json::to_string_pretty(user)?);
                    let mut held: Vec<&str> = console.session().permissions().iter().map(|p| p.as_str()).collect();
                    held.sort_unstable();
                    println!("permissions: {}", held.join(", "));
                }
                None => println!("Logged in, but no user record is persisted"),
            }
            Ok(())
        }
        Command::Customers { action } => match action {
            CustomerAction::List(list_args) => {
                if !enter(console, "/customers") {
                    return Ok(());
                }
                let transport = console.transport().clone();
                run_list(console, list_args, move || {
                    let transport = transport.clone();
                    async move { customers::list(&transport).await }
                })
                .await
            }
            CustomerAction::Create {
                name,
                phone,
                email,
                status,
                address,
            } => {
                if !enter(console, "/customers/form") {
                    return Ok(());
                }
                let created = customers::create(
                    console.transport(),
                    &CustomerCreate {
                        name,
                        phone,
                        email,
                        status,
                        address,
                        created_at: Some(chrono::Utc::now()),
                    },
                )
                .await?;
                println!("{}", serde_json::to_string_pretty(&created)?);
                Ok(())
            }
            CustomerAction::Update {
                id,
                name,
                phone,
                email,
                status,
                address,
            } => {
                if !enter(console, "/customers/form") {
                    return Ok(());
                }
                let updated = customers::update(
                    console.transport(),
                    id,
                    &CustomerCreate {
                        name,
                        phone,
                        email,
                        status,
                        address,
                        created_at: None,
                    },
                )
                .await?;
                println!("{}", serde_json::to_string_pretty(&updated)?);
                Ok(())
            }
            CustomerAction::Delete { id } => {
                if !enter(console, "/customers") {
                    return Ok(());
                }
                customers::delete(console.transport(), id).await?;
                println!("Deleted customer {id}");
                Ok(())
            }
        },
        Command::Users { action } => match action {
            UserAction::List(list_args) => {
                if !enter(console, "/users") {
                    return Ok(());
                }
                let transport = console.transport().clone();
                run_list(console, list_args, move || {
                    let transport = transport.clone();
                    async move { users::list(&transport).await }
                })
                .await
            }
            UserAction::Register {
                username,
                password,
                role,
                nickname,
                email,
            } => {
                let created = console
                    .session()
                    .register(&RegisterForm {
                        username,
                        password,
                        role,
                        nickname,
                        email,
                    })
                    .await?;
                println!("Registered {} (id {})", created.username, created.id);
                Ok(())
            }
            UserAction::Delete { id } => {
                if !enter(console, "/users") {
                    return Ok(());
                }
                users::delete(console.transport(), id).await?;
                println!("Deleted user {id}");
                Ok(())
            }
        },
        Command::Roles { action } => match action {
            RoleAction::List(list_args) => {
                if !enter(console, "/roles") {
                    return Ok(());
                }
                let transport = console.transport().clone();
                run_list(console, list_args, move || {
                    let transport = transport.clone();
                    async move { roles::list(&transport).await }
                })
                .await
            }
            RoleAction::Create { code, name, permissions } => {
                if !enter(console, "/roles") {
                    return Ok(());
                }
                let created = roles::create(
                    console.transport(),
                    &crate::api::models::roles::RoleCreate {
                        code,
                        name,
                        permissions: permissions.into_iter().map(crate::types::Permission::new).collect(),
                    },
                )
                .await?;
                println!("{}", serde_json::to_string_pretty(&created)?);
                Ok(())
            }
            RoleAction::Delete { id } => {
                if !enter(console, "/roles") {
                    return Ok(());
                }
                roles::delete(console.transport(), id).await?;
                println!("Deleted role {id}");
                Ok(())
            }
        },
        Command::Statuses => {
            if !enter(console, "/customers") {
                return Ok(());
            }
            let statuses = customers::statuses(console.transport()).await?;
            println!("{}", serde_json::to_string_pretty(&statuses)?);
            Ok(())
        }
        Command::Dashboard => {
            if !enter(console, routes::ROOT_PATH) {
                return Ok(());
            }
            let metrics = dashboard::metrics(console.transport()).await?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            Ok(())
        }
    }
}

/// Navigate to `path`; print the redirect target when the guard bounces.
fn enter(console: &mut Console, path: &str) -> bool {
    match console.navigate(path) {
        GuardOutcome::Allow => true,
        outcome => {
            tracing::debug!(?outcome, path, "Navigation redirected");
            println!("Redirected to {}", console.current_path().unwrap_or(path));
            false
        }
    }
}

/// Drive one list command through the list engine and print the page.
async fn run_list<T, F, Fut>(console: &Console, args: ListArgs, fetch: F) -> Result<()>
where
    T: Serialize + Clone + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    let options = ListOptions {
        initial_search_form: SearchForm::from_iter(args.filters.clone()),
        default_page_size: args.page_size.unwrap_or(console.config().list.default_page_size),
        custom_filter: None,
    };
    let controller = ListController::from_fn(fetch, options, Arc::new(TracingNotifier));

    match args.page {
        Some(page) => controller.set_page(page).await,
        None => controller.fetch_data().await,
    }

    let snapshot = controller.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot.items)?);
    println!(
        "total {} | page {} | page size {} | showing {}",
        snapshot.total,
        snapshot.page_num,
        snapshot.page_size,
        snapshot.items.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(parse_key_val("name=Acme").unwrap(), ("name".to_string(), "Acme".to_string()));
        assert_eq!(parse_key_val("status=").unwrap(), ("status".to_string(), String::new()));
        assert!(parse_key_val("no-equals").is_err());
    }

    #[test]
    fn test_cli_parses_nested_subcommands() {
        let cli = Cli::parse_from([
            "crmctl",
            "customers",
            "list",
            "--filter",
            "name=Acme",
            "--filter",
            "status=active",
            "--page",
            "2",
        ]);

        match cli.command {
            Some(Command::Customers {
                action: CustomerAction::List(args),
            }) => {
                assert_eq!(args.filters.len(), 2);
                assert_eq!(args.page, Some(2));
                assert_eq!(args.page_size, None);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_cli_verifies_cleanly() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
