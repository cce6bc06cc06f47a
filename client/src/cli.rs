//! Command-line front end for the `bloodbank` binary.
//!
//! Parsing is handled by clap; each command is dispatched to the matching
//! domain service and its result rendered as JSON.

use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use mockable::Clock;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::config::ClientSettings;
use crate::domain::ports::{BloodBankGateway, TokenStore};
use crate::domain::{
    AuthService, BloodGroup, DashboardAggregator, DashboardService, DonationDraft,
    DonorProfileDraft, DonorRegistry, Error, HistoryLedger, LoginCredentials, ProfileUpdate,
    RegistrationDraft, RequestDraft, RequestId, RequestWorkflow, SearchQuery, Session,
};
use crate::outbound::{DEFAULT_USER_AGENT, FileTokenStore, HttpGateway};

/// `bloodbank` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bloodbank",
    about = "Coordinate donors, blood requests and donation history",
    version
)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Log in and remember the session token.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Forget the session token.
    Logout,
    /// Create a donor or recipient account.
    Register(RegisterArgs),
    /// Show the profile, or update it when any field is given.
    Profile(ProfileArgs),
    /// List donors, optionally filtered by name, group or city.
    Donors {
        /// Case-insensitive search text.
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Create or replace the caller's donor profile.
    DonorProfile(DonorProfileArgs),
    /// Work with blood requests.
    Request {
        /// Request action.
        #[command(subcommand)]
        action: RequestCommand,
    },
    /// Show donation and receipt history.
    History {
        /// `donation` or `received`.
        #[arg(long = "type", value_name = "entry-type")]
        entry_type: Option<String>,
        /// Earliest date, `YYYY-MM-DD`.
        #[arg(long = "from", value_name = "date")]
        start_date: Option<String>,
        /// Latest date, `YYYY-MM-DD`.
        #[arg(long = "to", value_name = "date")]
        end_date: Option<String>,
    },
    /// Record a donation.
    Donate(DonateArgs),
    /// Show dashboard figures.
    Dashboard,
}

/// `register` arguments.
#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    /// Full name.
    #[arg(long)]
    pub full_name: String,
    /// Account email.
    #[arg(long)]
    pub email: String,
    /// Account password.
    #[arg(long)]
    pub password: String,
    /// `donor` or `recipient`.
    #[arg(long, default_value = "donor")]
    pub role: String,
    /// Contact number.
    #[arg(long)]
    pub phone_number: Option<String>,
    /// Age in years.
    #[arg(long)]
    pub age: Option<u32>,
    /// Blood group, e.g. `O+`.
    #[arg(long)]
    pub blood_group: Option<String>,
    /// Home city.
    #[arg(long)]
    pub city: Option<String>,
    /// Most recent donation, `YYYY-MM-DD`.
    #[arg(long)]
    pub last_donation_date: Option<NaiveDate>,
}

impl From<RegisterArgs> for RegistrationDraft {
    fn from(args: RegisterArgs) -> Self {
        Self {
            full_name: args.full_name,
            email: args.email,
            password: args.password,
            role: args.role,
            phone_number: args.phone_number,
            age: args.age,
            blood_group: args.blood_group,
            city: args.city,
            last_donation_date: args.last_donation_date,
        }
    }
}

/// `profile` arguments; all optional.
#[derive(Debug, Clone, Default, Args)]
pub struct ProfileArgs {
    /// New full name.
    #[arg(long)]
    pub full_name: Option<String>,
    /// New contact number.
    #[arg(long)]
    pub phone_number: Option<String>,
    /// New age.
    #[arg(long)]
    pub age: Option<u32>,
    /// New blood group.
    #[arg(long)]
    pub blood_group: Option<BloodGroup>,
    /// New home city.
    #[arg(long)]
    pub city: Option<String>,
    /// New last donation date.
    #[arg(long)]
    pub last_donation_date: Option<NaiveDate>,
}

impl From<ProfileArgs> for ProfileUpdate {
    fn from(args: ProfileArgs) -> Self {
        Self {
            full_name: args.full_name,
            phone_number: args.phone_number,
            age: args.age,
            blood_group: args.blood_group,
            city: args.city,
            last_donation_date: args.last_donation_date,
        }
    }
}

/// `donor-profile` arguments.
#[derive(Debug, Clone, Args)]
pub struct DonorProfileArgs {
    /// Blood group, e.g. `O+`.
    #[arg(long)]
    pub blood_group: String,
    /// City.
    #[arg(long)]
    pub city: String,
    /// Age in years.
    #[arg(long)]
    pub age: u32,
    /// Most recent donation, `YYYY-MM-DD`.
    #[arg(long)]
    pub last_donation_date: Option<NaiveDate>,
}

impl From<DonorProfileArgs> for DonorProfileDraft {
    fn from(args: DonorProfileArgs) -> Self {
        Self {
            blood_group: args.blood_group,
            city: args.city,
            age: args.age,
            last_donation_date: args.last_donation_date,
        }
    }
}

/// `request` actions.
#[derive(Debug, Clone, Subcommand)]
pub enum RequestCommand {
    /// Post a new blood request.
    Create {
        /// Required blood group.
        #[arg(long)]
        blood_group: String,
        /// City where blood is needed.
        #[arg(long)]
        city: String,
        /// `normal`, `high` or `critical`.
        #[arg(long, default_value = "normal")]
        urgency: String,
        /// Patient name.
        #[arg(long)]
        patient_name: Option<String>,
    },
    /// List requests, most urgent first.
    List {
        /// Case-insensitive search text.
        #[arg(long)]
        query: Option<String>,
    },
    /// List donors the backend matched to a request.
    Matches {
        /// Request identifier.
        id: i64,
    },
}

/// `donate` arguments.
#[derive(Debug, Clone, Args)]
pub struct DonateArgs {
    /// Hospital where the donation took place.
    #[arg(long)]
    pub hospital: String,
    /// Blood group donated.
    #[arg(long)]
    pub blood_group: String,
    /// Donation date, `YYYY-MM-DD`.
    #[arg(long)]
    pub date: String,
    /// Units donated.
    #[arg(long, default_value_t = 1)]
    pub units: i64,
}

impl From<DonateArgs> for DonationDraft {
    fn from(args: DonateArgs) -> Self {
        Self {
            hospital: args.hospital,
            blood_group: args.blood_group,
            date: args.date,
            units: args.units,
        }
    }
}

/// Services wired around one gateway and one session.
pub struct App<G> {
    session: Arc<Session>,
    auth: AuthService<G>,
    registry: DonorRegistry<G>,
    workflow: RequestWorkflow<G>,
    ledger: HistoryLedger<G>,
    dashboard: DashboardService<G>,
}

impl<G> App<G> {
    /// Wire every service around `gateway` and `session`.
    #[must_use]
    pub fn new(
        gateway: Arc<G>,
        session: Arc<Session>,
        clock: Arc<dyn Clock>,
        aggregator: DashboardAggregator,
    ) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&gateway), Arc::clone(&session)),
            registry: DonorRegistry::new(
                Arc::clone(&gateway),
                Arc::clone(&session),
                Arc::clone(&clock),
            ),
            workflow: RequestWorkflow::new(
                Arc::clone(&gateway),
                Arc::clone(&session),
                Arc::clone(&clock),
            ),
            ledger: HistoryLedger::new(Arc::clone(&gateway), Arc::clone(&session), clock),
            dashboard: DashboardService::new(gateway, Arc::clone(&session), aggregator),
            session,
        }
    }

    /// Session shared by the services.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl App<HttpGateway> {
    /// Build the HTTP-backed application described by `settings`.
    ///
    /// The session is restored from the configured token file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for a malformed base URL or token path, and
    /// `InternalError` when the HTTP client cannot be built.
    pub fn from_settings(settings: &ClientSettings, clock: Arc<dyn Clock>) -> Result<Self, Error> {
        let base_url = settings
            .base_url()
            .map_err(|err| Error::invalid_field("base_url", format!("invalid base url: {err}")))?;
        let gateway = HttpGateway::new(base_url, settings.timeout(), DEFAULT_USER_AGENT)
            .map_err(|err| Error::internal(format!("failed to build http client: {err}")))?;
        let store: Arc<dyn TokenStore> = Arc::new(
            FileTokenStore::new(settings.token_file())
                .map_err(|err| Error::invalid_field("token_file", err.to_string()))?,
        );
        let session = Arc::new(Session::restore(store));
        Ok(Self::new(
            Arc::new(gateway),
            session,
            clock,
            DashboardAggregator::new(settings.activity_page_size()),
        ))
    }
}

fn render<T: Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value)
        .map_err(|err| Error::internal(format!("failed to render output: {err}")))
}

impl<G> App<G>
where
    G: BloodBankGateway,
{
    /// Execute `command` and return its JSON rendering.
    ///
    /// # Errors
    ///
    /// Returns the domain error raised by the service handling the command.
    pub async fn run(&self, command: Command) -> Result<Value, Error> {
        match command {
            Command::Login { email, password } => {
                let credentials = LoginCredentials::try_from_parts(&email, &password)
                    .map_err(|err| Error::invalid_request(err.to_string()))?;
                self.auth.login(&credentials).await?;
                info!("logged in");
                Ok(json!({ "authenticated": true }))
            }
            Command::Logout => {
                self.auth.logout()?;
                Ok(json!({ "authenticated": false }))
            }
            Command::Register(args) => render(&self.auth.register(args.into()).await?),
            Command::Profile(args) => {
                render(&self.auth.update_profile(ProfileUpdate::from(args)).await?)
            }
            Command::Donors { query } => {
                self.registry.refresh().await?;
                render(&self.registry.filter(&SearchQuery::new(&query)))
            }
            Command::DonorProfile(args) => {
                render(&self.registry.create_profile(args.into()).await?)
            }
            Command::Request { action } => self.run_request(action).await,
            Command::History {
                entry_type,
                start_date,
                end_date,
            } => render(
                &self
                    .ledger
                    .get_history_from_strs(
                        entry_type.as_deref(),
                        start_date.as_deref(),
                        end_date.as_deref(),
                    )
                    .await?,
            ),
            Command::Donate(args) => render(&self.ledger.log_donation(args.into()).await?),
            Command::Dashboard => render(&self.dashboard.summary().await?),
        }
    }

    async fn run_request(&self, action: RequestCommand) -> Result<Value, Error> {
        match action {
            RequestCommand::Create {
                blood_group,
                city,
                urgency,
                patient_name,
            } => {
                let draft = RequestDraft {
                    blood_group,
                    city,
                    urgency,
                    patient_name,
                };
                render(&self.workflow.create_request(draft).await?)
            }
            RequestCommand::List { query } => {
                let query = query.as_deref().map(SearchQuery::new);
                render(&self.workflow.list_requests(query.as_ref()).await?)
            }
            RequestCommand::Matches { id } => {
                render(&self.workflow.find_matches(RequestId::new(id)).await?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Argument parsing and dispatch coverage.
    use super::*;
    use crate::domain::ports::{InMemoryTokenStore, MockBloodBankGateway};
    use crate::domain::{AccessToken, ErrorCode, Role, User, UserId};
    use mockable::DefaultClock;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("bloodbank").chain(args.iter().copied()))
            .expect("arguments should parse")
            .command
    }

    fn app(gateway: MockBloodBankGateway, logged_in: bool) -> App<MockBloodBankGateway> {
        let store = if logged_in {
            InMemoryTokenStore::with_token(AccessToken::new("tok").expect("token"))
        } else {
            InMemoryTokenStore::default()
        };
        App::new(
            Arc::new(gateway),
            Arc::new(Session::restore(Arc::new(store))),
            Arc::new(DefaultClock),
            DashboardAggregator::default(),
        )
    }

    #[rstest]
    fn parses_history_filters() {
        let command = parse(&["history", "--type", "donation", "--from", "2024-01-01"]);
        let Command::History {
            entry_type,
            start_date,
            end_date,
        } = command
        else {
            panic!("expected history command");
        };
        assert_eq!(entry_type.as_deref(), Some("donation"));
        assert_eq!(start_date.as_deref(), Some("2024-01-01"));
        assert!(end_date.is_none());
    }

    #[rstest]
    fn parses_request_matches_id() {
        let command = parse(&["request", "matches", "42"]);
        assert!(matches!(
            command,
            Command::Request {
                action: RequestCommand::Matches { id: 42 }
            }
        ));
    }

    #[rstest]
    fn rejects_unknown_profile_blood_group() {
        let result = Cli::try_parse_from(["bloodbank", "profile", "--blood-group", "C+"]);
        assert!(result.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn logged_out_dashboard_fails_without_backend_calls() {
        let app = app(MockBloodBankGateway::new(), false);
        let err = app
            .run(Command::Dashboard)
            .await
            .expect_err("dashboard requires login");
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_login_email_is_rejected_locally() {
        let app = app(MockBloodBankGateway::new(), false);
        let err = app
            .run(parse(&["login", "--email", "nobody", "--password", "pw"]))
            .await
            .expect_err("email is malformed");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn profile_renders_user_json() {
        let mut gateway = MockBloodBankGateway::new();
        gateway.expect_profile().times(1).returning(|_| {
            Ok(User {
                id: UserId::new(7),
                full_name: "Ali Raza".to_owned(),
                email: crate::domain::EmailAddress::new("ali@example.com").expect("email"),
                role: Role::Donor,
                phone_number: None,
                age: Some(30),
                blood_group: Some(BloodGroup::OPositive),
                city: Some("Lahore".to_owned()),
                last_donation_date: None,
            })
        });
        let app = app(gateway, true);
        let output = app
            .run(parse(&["profile"]))
            .await
            .expect("profile renders");
        assert_eq!(output["full_name"], "Ali Raza");
        assert_eq!(output["blood_group"], "O+");
    }

    #[rstest]
    #[tokio::test]
    async fn logout_clears_the_session() {
        let app = app(MockBloodBankGateway::new(), true);
        let output = app.run(Command::Logout).await.expect("logout");
        assert_eq!(output, json!({ "authenticated": false }));
        assert!(!app.session().is_authenticated());
    }
}
