//! The catalog service behind every page and form.

use gameshelf_catalog::forms::*;
use gameshelf_catalog::types::*;
use gameshelf_db::queries::CatalogStats;
use gameshelf_db::{LoginError, OperationError};
use gameshelf_import::LogProgress;
use rusqlite::Connection;

use crate::error::{ShelfError, SubmitError};
use crate::settings::Settings;

/// Owns the database connection and serves the catalog.
pub struct Shelf {
    conn: Connection,
}

impl Shelf {
    /// Open the database named by `settings`, seeding it on first use.
    pub fn open(settings: &Settings) -> Result<Self, ShelfError> {
        let conn = gameshelf_db::open_database(&settings.database)?;
        if let Some(stats) = gameshelf_import::bootstrap(&conn, &settings.seed_dir, &LogProgress)? {
            log::info!(
                "Seeded new database {} with {} rows",
                settings.database.display(),
                stats.total_rows()
            );
        }
        Ok(Self { conn })
    }

    /// An empty in-memory catalog.
    pub fn open_memory() -> Result<Self, ShelfError> {
        Ok(Self {
            conn: gameshelf_db::open_memory()?,
        })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ── Pages ───────────────────────────────────────────────────────────────

    /// Most recent releases for the home page.
    pub fn home(&self) -> Result<Vec<Game>, ShelfError> {
        Ok(gameshelf_db::latest_games(&self.conn, gameshelf_db::LATEST_GAMES)?)
    }

    pub fn search(&self, needle: &str) -> Result<Vec<Game>, ShelfError> {
        Ok(gameshelf_db::search_games(&self.conn, needle)?)
    }

    pub fn games(&self, sort: GameSort) -> Result<Vec<Game>, ShelfError> {
        Ok(gameshelf_db::list_games(&self.conn, sort)?)
    }

    pub fn game(&self, title: &str) -> Result<Option<GameDetail>, ShelfError> {
        Ok(gameshelf_db::game_detail(&self.conn, title)?)
    }

    pub fn company(&self, name: &str) -> Result<Option<Company>, ShelfError> {
        Ok(gameshelf_db::company_detail(&self.conn, name)?)
    }

    pub fn platform(&self, name: &str) -> Result<Option<Platform>, ShelfError> {
        Ok(gameshelf_db::platform_detail(&self.conn, name)?)
    }

    pub fn companies(&self) -> Result<Vec<Company>, ShelfError> {
        Ok(gameshelf_db::list_companies(&self.conn)?)
    }

    pub fn platforms(&self) -> Result<Vec<Platform>, ShelfError> {
        Ok(gameshelf_db::list_platforms(&self.conn)?)
    }

    pub fn games_for_platform(&self, platform: &str) -> Result<Vec<Game>, ShelfError> {
        Ok(gameshelf_db::games_for_platform(&self.conn, platform)?)
    }

    pub fn games_published_by(&self, company: &str) -> Result<Vec<Game>, ShelfError> {
        Ok(gameshelf_db::games_published_by(&self.conn, company)?)
    }

    pub fn games_developed_by(&self, company: &str) -> Result<Vec<Game>, ShelfError> {
        Ok(gameshelf_db::games_developed_by(&self.conn, company)?)
    }

    pub fn stats(&self) -> Result<CatalogStats, ShelfError> {
        Ok(gameshelf_db::catalog_stats(&self.conn)?)
    }

    // ── Accounts ────────────────────────────────────────────────────────────

    pub fn signup(&self, form: SignupForm) -> Result<User, SubmitError<SignupForm>> {
        let user = match form.validate() {
            Ok(user) => user,
            Err(error) => return Err(reject(form, error)),
        };
        match gameshelf_db::create_user(&self.conn, &user) {
            Ok(created) => Ok(created),
            Err(OperationError::Duplicate { .. }) => {
                let error = FieldError::AlreadyExists {
                    field: "username",
                    name: user.name,
                };
                Err(reject(form, error))
            }
            Err(e) => Err(SubmitError::storage(e)),
        }
    }

    pub fn login(&self, form: LoginForm) -> Result<User, SubmitError<LoginForm>> {
        let credentials = match form.validate() {
            Ok(credentials) => credentials,
            Err(error) => return Err(reject(form, error)),
        };
        match gameshelf_db::login(&self.conn, &credentials.username, &credentials.password) {
            Ok(user) => Ok(user),
            Err(LoginError::InvalidCredentials) => {
                Err(reject(form, FieldError::InvalidCredentials))
            }
            Err(LoginError::Db(e)) => Err(SubmitError::storage(e)),
        }
    }

    // ── Catalog edits ───────────────────────────────────────────────────────

    /// Add a game with one publisher and one platform.
    ///
    /// After the form itself validates, the title must be new and the
    /// developer, publisher, and platform must already exist.
    pub fn create_game(&self, form: GameForm) -> Result<Game, SubmitError<GameForm>> {
        let game = match form.validate() {
            Ok(game) => game,
            Err(error) => return Err(reject(form, error)),
        };
        match self.check_new_game(&game) {
            Ok(Some(error)) => return Err(reject(form, error)),
            Ok(None) => {}
            Err(e) => return Err(SubmitError::Storage(e)),
        }
        match gameshelf_db::create_game(&self.conn, &game) {
            Ok(created) => Ok(created),
            Err(OperationError::UnresolvedReference { name, .. }) => {
                let error = unknown(submitted_field(&game, &name), &name);
                Err(reject(form, error))
            }
            Err(e) => match field_error(e, "title") {
                Ok(error) => Err(reject(form, error)),
                Err(e) => Err(SubmitError::storage(e)),
            },
        }
    }

    fn check_new_game(&self, game: &NewGame) -> Result<Option<FieldError>, ShelfError> {
        if gameshelf_db::find_game_id(&self.conn, &game.title)?.is_some() {
            return Ok(Some(FieldError::AlreadyExists {
                field: "title",
                name: game.title.clone(),
            }));
        }
        if let Some(developer) = &game.developer {
            if gameshelf_db::find_company_id(&self.conn, developer)?.is_none() {
                return Ok(Some(unknown("developer", developer)));
            }
        }
        for publisher in &game.publishers {
            if gameshelf_db::find_company_id(&self.conn, publisher)?.is_none() {
                return Ok(Some(unknown("publisher", publisher)));
            }
        }
        for platform in &game.platforms {
            if gameshelf_db::find_platform_id(&self.conn, platform)?.is_none() {
                return Ok(Some(unknown("platform", platform)));
            }
        }
        Ok(None)
    }

    /// Change the editable details of the game titled `title`.
    pub fn edit_game(
        &self,
        title: &str,
        form: GameEditForm,
    ) -> Result<(), SubmitError<GameEditForm>> {
        let update = match form.validate() {
            Ok(update) => update,
            Err(error) => return Err(reject(form, error)),
        };
        match gameshelf_db::update_game(&self.conn, title, &update) {
            Ok(()) => Ok(()),
            Err(e) => match field_error(e, "game") {
                Ok(error) => Err(reject(form, error)),
                Err(e) => Err(SubmitError::storage(e)),
            },
        }
    }

    pub fn create_company(&self, form: CompanyForm) -> Result<Company, SubmitError<CompanyForm>> {
        let company = match form.validate() {
            Ok(company) => company,
            Err(error) => return Err(reject(form, error)),
        };
        match gameshelf_db::find_company_id(&self.conn, &company.name) {
            Ok(Some(_)) => {
                let error = FieldError::AlreadyExists {
                    field: "name",
                    name: company.name,
                };
                return Err(reject(form, error));
            }
            Ok(None) => {}
            Err(e) => return Err(SubmitError::storage(e)),
        }
        match gameshelf_db::create_company(&self.conn, &company) {
            Ok(created) => Ok(created),
            Err(e) => match field_error(e, "name") {
                Ok(error) => Err(reject(form, error)),
                Err(e) => Err(SubmitError::storage(e)),
            },
        }
    }

    /// Add a platform. There is no form for this; platforms come from seed
    /// data or administrative tooling.
    pub fn create_platform(&self, platform: &NewPlatform) -> Result<Platform, ShelfError> {
        Ok(gameshelf_db::create_platform(&self.conn, platform)?)
    }

    pub fn attach_platform(
        &self,
        title: &str,
        form: AttachForm,
    ) -> Result<(), SubmitError<AttachForm>> {
        self.attach(title, form, "platform", gameshelf_db::attach_platform)
    }

    pub fn attach_publisher(
        &self,
        title: &str,
        form: AttachForm,
    ) -> Result<(), SubmitError<AttachForm>> {
        self.attach(title, form, "publisher", gameshelf_db::attach_publisher)
    }

    fn attach(
        &self,
        title: &str,
        form: AttachForm,
        field: &'static str,
        op: fn(&Connection, &str, &str) -> Result<(), OperationError>,
    ) -> Result<(), SubmitError<AttachForm>> {
        let name = match form.validate(field) {
            Ok(name) => name,
            Err(error) => return Err(reject(form, error)),
        };
        match op(&self.conn, title, &name) {
            Ok(()) => Ok(()),
            Err(OperationError::Duplicate { .. }) => {
                Err(reject(form, FieldError::AlreadyAttached { field, name }))
            }
            Err(OperationError::UnresolvedReference { name, .. }) => {
                Err(reject(form, unknown(field, &name)))
            }
            Err(OperationError::NotFound { key, .. }) => Err(reject(form, unknown("game", &key))),
            Err(e) => Err(SubmitError::storage(e)),
        }
    }
}

fn reject<F>(form: F, error: FieldError) -> SubmitError<F> {
    log::warn!("Rejected submission: {}", error);
    SubmitError::rejected(form, error)
}

fn unknown(field: &'static str, name: &str) -> FieldError {
    FieldError::UnknownReference {
        field,
        name: name.to_string(),
    }
}

/// The game form field that submitted the reference `name`.
fn submitted_field(game: &NewGame, name: &str) -> &'static str {
    if game.developer.as_deref() == Some(name) {
        "developer"
    } else if game.platforms.iter().any(|p| p == name) {
        "platform"
    } else {
        "publisher"
    }
}

/// Turn a write failure caused by the data itself into a form error.
/// Anything else is handed back as a storage fault.
fn field_error(e: OperationError, key_field: &'static str) -> Result<FieldError, OperationError> {
    match e {
        OperationError::Duplicate { key, .. } => Ok(FieldError::AlreadyExists {
            field: key_field,
            name: key,
        }),
        OperationError::NotFound { key, .. } => Ok(unknown(key_field, &key)),
        OperationError::InvalidValue { source, .. } => Ok(source),
        other => Err(other),
    }
}
