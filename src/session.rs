//! The interactive menu session.
//!
//! A [`Session`] owns the single database connection for its whole life and
//! hands it to each menu operation in turn.

use crate::db::{DatabaseConnection, DeleteOutcome};
use crate::export::write_xlsx;
use crate::model::{
    ChartPoint, NewDemographics, NewHealthRecord, NewSmoker, NewSmokerProfile, NewSmokingHabit,
    SortColumn, SortOrder,
};
use crate::prompt::{LineSource, Prompter, is_end_of_input, parse_integer};
use crate::report::render_table;
use crate::settings::Settings;
use anyhow::Result;
use std::future::Future;
use std::io::Write;
use tracing::{debug, warn};

pub const MENU: &str = "
Hello! Please select one from below:
1. To create smoker data.
2. To get a single smoker record.
3. To get all smoker records.
4. To delete a smoker record.
5. To export all data into Excel.
6. To display cigarettes per day chart.
7. To sort data.
8. To stop.

";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Create,
    Lookup,
    ListAll,
    Delete,
    Export,
    Chart,
    Sorted,
    Stop,
}

impl MenuChoice {
    pub fn from_number(n: i64) -> Option<MenuChoice> {
        match n {
            1 => Some(MenuChoice::Create),
            2 => Some(MenuChoice::Lookup),
            3 => Some(MenuChoice::ListAll),
            4 => Some(MenuChoice::Delete),
            5 => Some(MenuChoice::Export),
            6 => Some(MenuChoice::Chart),
            7 => Some(MenuChoice::Sorted),
            8 => Some(MenuChoice::Stop),
            _ => None,
        }
    }
}

pub type ChartViewer = fn(&[ChartPoint]) -> Result<()>;

pub struct Session<L, W> {
    db: DatabaseConnection,
    prompter: Prompter<L, W>,
    settings: Settings,
    chart_viewer: ChartViewer,
}

impl<L: LineSource, W: Write> Session<L, W> {
    pub fn new(db: DatabaseConnection, prompter: Prompter<L, W>, settings: Settings) -> Self {
        Session {
            db,
            prompter,
            settings,
            chart_viewer: crate::tui::show_chart,
        }
    }

    /// Replaces the full-screen chart, e.g. when there is no terminal to draw on.
    pub fn with_chart_viewer(mut self, viewer: ChartViewer) -> Self {
        self.chart_viewer = viewer;
        self
    }

    /// Closes the connection and hands back the terminal halves.
    pub fn close(self) -> (L, W) {
        self.db.close();
        self.prompter.into_parts()
    }

    /// Runs the menu until it ends or `interrupt` completes, then closes the
    /// connection either way. Returns `true` when interrupted.
    pub async fn run_until<F: Future>(mut self, interrupt: F) -> Result<bool> {
        let outcome = tokio::select! {
            res = self.run() => Some(res),
            _ = interrupt => None,
        };
        self.close();
        match outcome {
            Some(res) => res.map(|()| false),
            None => Ok(true),
        }
    }

    /// Runs the menu until the user stops or input runs out.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let number = match self.prompter.ask(MENU, parse_integer).await {
                Ok(n) => n,
                Err(e) if is_end_of_input(&e) => {
                    writeln!(self.prompter.out())?;
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            if let Err(e) = self.db.create_tables().await {
                self.report(&e)?;
            }

            let Some(choice) = MenuChoice::from_number(number) else {
                writeln!(self.prompter.out(), "Please choose valid selection.")?;
                continue;
            };
            if choice == MenuChoice::Stop {
                writeln!(self.prompter.out(), "Stopping...")?;
                return Ok(());
            }

            debug!(?choice, "dispatch");
            match self.dispatch(choice).await {
                Ok(()) => {}
                Err(e) if is_end_of_input(&e) => return Ok(()),
                Err(e) => self.report(&e)?,
            }
        }
    }

    fn report(&mut self, err: &anyhow::Error) -> Result<()> {
        warn!("operation failed: {:#}", err);
        writeln!(self.prompter.out(), "Error: {:#}", err)?;
        Ok(())
    }

    pub async fn dispatch(&mut self, choice: MenuChoice) -> Result<()> {
        match choice {
            MenuChoice::Create => self.create_smoker().await,
            MenuChoice::Lookup => {
                let phone = self
                    .prompter
                    .text("Enter the phone number to retrieve information: ")
                    .await?;
                self.lookup(&phone).await
            }
            MenuChoice::ListAll => self.list_all().await,
            MenuChoice::Delete => {
                let id = self
                    .prompter
                    .integer("Enter the smoker_id to delete: ")
                    .await?;
                self.delete(id).await.map(|_| ())
            }
            MenuChoice::Export => self.export().await,
            MenuChoice::Chart => self.chart().await,
            MenuChoice::Sorted => self.sorted().await,
            MenuChoice::Stop => Ok(()),
        }
    }

    async fn read_profile(&mut self) -> Result<NewSmokerProfile> {
        let p = &mut self.prompter;

        let smoker = NewSmoker {
            first_name: p.required_text("Enter first name: ").await?,
            last_name: p.required_text("Enter last name: ").await?,
            date_of_birth: p.date("Enter date of birth (YYYY-MM-DD): ").await?,
            gender: p.text("Enter gender: ").await?,
            contact_information: p.required_text("Enter contact information: ").await?,
        };
        writeln!(p.out())?;

        let habit = NewSmokingHabit {
            start_date: p
                .optional_date("Enter start date of smoking (YYYY-MM-DD, blank if never): ")
                .await?,
            quit_date: p
                .optional_date("Enter quit date (YYYY-MM-DD, blank if not quit): ")
                .await?,
            cigarettes_per_day: p.count("Enter cigarettes per day: ").await?,
            pack_years: p.count("Enter pack years: ").await?,
            smoking_status: p
                .text("Enter smoking status (e.g., current, former, never): ")
                .await?,
        };
        writeln!(p.out())?;

        let health = NewHealthRecord {
            record_date: p.date("Enter record date (YYYY-MM-DD): ").await?,
            health_condition: p.text("Enter health condition: ").await?,
            diagnosis_date: p
                .optional_date("Enter diagnosis date (YYYY-MM-DD, blank if none): ")
                .await?,
            treatment_history: p.text("Enter treatment history: ").await?,
            severity: p
                .text("Enter severity (e.g., mild, moderate, severe): ")
                .await?,
        };
        writeln!(p.out())?;

        let demographics = NewDemographics {
            education_level: p.text("Enter education level: ").await?,
            income_level: p.text("Enter income level: ").await?,
            employment_status: p.text("Enter employment status: ").await?,
            ethnicity: p.text("Enter ethnicity: ").await?,
            location: p.text("Enter location: ").await?,
        };

        Ok(NewSmokerProfile {
            smoker,
            habit,
            health,
            demographics,
        })
    }

    pub async fn create_smoker(&mut self) -> Result<()> {
        let profile = self.read_profile().await?;
        let smoker_id = self.db.insert_profile(&profile).await?;
        writeln!(
            self.prompter.out(),
            "Smoker and associated records created successfully (smoker_id {}).",
            smoker_id
        )?;
        Ok(())
    }

    pub async fn lookup(&mut self, phone: &str) -> Result<()> {
        let rows = self.db.find_by_contact(phone).await?;
        if rows.is_empty() {
            writeln!(self.prompter.out(), "Smoker not found.")?;
        } else {
            writeln!(self.prompter.out(), "{}", render_table(&rows))?;
        }
        Ok(())
    }

    pub async fn list_all(&mut self) -> Result<()> {
        let rows = self.db.list_all().await?;
        if rows.is_empty() {
            writeln!(self.prompter.out(), "No records found.")?;
        } else {
            writeln!(self.prompter.out(), "{}", render_table(&rows))?;
        }
        Ok(())
    }

    pub async fn delete(&mut self, smoker_id: i64) -> Result<DeleteOutcome> {
        // Ids outside the INTEGER range cannot exist.
        let outcome = match i32::try_from(smoker_id) {
            Ok(id) => self.db.delete_smoker(id).await?,
            Err(_) => DeleteOutcome::NotFound,
        };
        match outcome {
            DeleteOutcome::NotFound => {
                writeln!(self.prompter.out(), "No record found with this ID.")?
            }
            DeleteOutcome::Deleted { .. } => writeln!(
                self.prompter.out(),
                "Smoker and associated records deleted successfully."
            )?,
        }
        Ok(outcome)
    }

    pub async fn export(&mut self) -> Result<()> {
        let rows = self.db.list_all().await?;
        if rows.is_empty() {
            writeln!(self.prompter.out(), "No records found.")?;
            return Ok(());
        }
        let path = self.settings.export_path.clone();
        write_xlsx(&rows, &path)?;
        writeln!(
            self.prompter.out(),
            "Data exported to {} successfully.",
            path.display()
        )?;
        Ok(())
    }

    pub async fn chart(&mut self) -> Result<()> {
        let points = self.db.chart_points().await?;
        if points.is_empty() {
            writeln!(self.prompter.out(), "No records found.")?;
            return Ok(());
        }
        (self.chart_viewer)(&points)
    }

    pub async fn sorted(&mut self) -> Result<()> {
        let column: SortColumn = self
            .prompter
            .ask(
                "Enter the column to sort by (default: last_name), e.g. first_name, date_of_birth, contact_information:\n",
                |s| s.parse(),
            )
            .await?;
        let order_input = self
            .prompter
            .line("Enter the sort order (ASC/DESC, default: ASC):\n")
            .await?;
        let order = match SortOrder::from_input(&order_input) {
            Some(order) => order,
            None => {
                writeln!(
                    self.prompter.out(),
                    "Invalid sort order. Using default order (ASC)."
                )?;
                SortOrder::Asc
            }
        };

        let rows = self.db.list_sorted(&column, order).await?;
        if rows.is_empty() {
            writeln!(self.prompter.out(), "No records found.")?;
        } else {
            writeln!(self.prompter.out(), "{}", render_table(&rows))?;
        }
        Ok(())
    }
}
