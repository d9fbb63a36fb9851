//! # Command Line Front End
//!
//! One subcommand per lending flow. Pages are numbered from 1 on the command
//! line and converted to the zero-based cursor the screens use.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{info, instrument};

use crate::auth::{CredentialStore, FileTokenStore, MemoryTokenStore};
use crate::client::ApiClient;
use crate::config::AppConfig;
use crate::controller::{
    AccountActivation, BorrowedBookList, CatalogSource, MyBooks, PageController, PageSource,
    ReturnedBookSource, ViewState,
};
use crate::models::{
    AuthenticationRequest, BookId, BookRequest, BookResponse, BorrowedBookResponse, CoverImage,
    FeedbackRequest, RegistrationRequest,
};
use crate::services::{AuthenticationService, BookService, FeedbackService, HttpBookNetwork};
use crate::telemetry::current_trace_id;

#[derive(Debug, Parser)]
#[command(name = "booknet", version, about = "Borrow, lend and return books on the Book Network")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

impl PageArgs {
    fn index(&self) -> u32 {
        self.page.saturating_sub(1)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List books shared by other members
    Books(PageArgs),
    /// List your own books
    Mine(PageArgs),
    /// List the books you borrowed
    Borrowed(PageArgs),
    /// List your books that borrowers returned
    Returned(PageArgs),
    /// Toggle the archived flag of one of your books
    Archive {
        id: BookId,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Toggle the shareable flag of one of your books
    Share {
        id: BookId,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Add a book to your shelf, or edit one with --id
    Add {
        /// Book to update instead of creating a new one
        #[arg(long)]
        id: Option<BookId>,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        synopsis: String,
        /// Let other members borrow the book
        #[arg(long)]
        shareable: bool,
        /// Cover picture to upload after saving
        #[arg(long)]
        cover: Option<PathBuf>,
    },
    /// Upload a cover picture for one of your books
    Cover { id: BookId, file: PathBuf },
    /// Borrow a book
    Borrow { id: BookId },
    /// Return a borrowed book, optionally leaving feedback
    Return {
        id: BookId,
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        comment: Option<String>,
        /// Rating from 0 to 5
        #[arg(long)]
        note: Option<f64>,
    },
    /// Approve that a borrowed book came back
    Approve { id: BookId },
    /// Leave feedback on a book
    Feedback {
        id: BookId,
        #[arg(long)]
        comment: String,
        #[arg(long)]
        note: f64,
    },
    /// Activate an account with the code received by email
    Activate { code: String },
    /// Log in and keep the issued token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

impl Command {
    /// Name recorded on the command's trace context.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Books(_) => "books",
            Command::Mine(_) => "mine",
            Command::Borrowed(_) => "borrowed",
            Command::Returned(_) => "returned",
            Command::Archive { .. } => "archive",
            Command::Share { .. } => "share",
            Command::Borrow { .. } => "borrow",
            Command::Return { .. } => "return",
            Command::Approve { .. } => "approve",
            Command::Feedback { .. } => "feedback",
            Command::Activate { .. } => "activate",
            Command::Login { .. } => "login",
            Command::Register { .. } => "register",
            Command::Add { .. } => "add",
            Command::Cover { .. } => "cover",
        }
    }
}

/// Token store selected by configuration: the token file when one is set,
/// otherwise an in-memory store seeded with `BOOKNET_TOKEN`.
pub fn credential_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
    match &config.token_file {
        Some(path) => {
            let store = FileTokenStore::new(path.clone());
            if let Some(token) = &config.token
                && store.get().is_none()
            {
                store.set(token).context("seeding token file")?;
            }
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryTokenStore::new(config.token.clone()))),
    }
}

/// Run one command against the configured backend.
#[instrument(skip_all, fields(command = cli.command.name(), trace_id = %current_trace_id().unwrap_or_default()))]
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let credentials = credential_store(&config)?;
    let api = ApiClient::from_config(&config, credentials).context("building api client")?;
    let network = Arc::new(HttpBookNetwork::new(api));
    let first_page = config.first_page_behavior();

    match cli.command {
        Command::Books(args) => {
            let source: Arc<dyn PageSource<BookResponse>> =
                Arc::new(CatalogSource::new(network.clone()));
            let mut list = PageController::new(source, config.my_books_page_size())
                .with_first_page_behavior(first_page);
            show_page(&mut list, args.index(), render_book).await?;
        }
        Command::Mine(args) => {
            let mut screen = MyBooks::new(network.clone(), config.my_books_page_size(), first_page);
            show_page(screen.list_mut(), args.index(), render_book).await?;
        }
        Command::Borrowed(args) => {
            let mut screen = BorrowedBookList::new(
                network.clone(),
                network.clone(),
                config.borrowed_page_size(),
                first_page,
            );
            show_page(screen.list_mut(), args.index(), render_borrowed).await?;
        }
        Command::Returned(args) => {
            let source: Arc<dyn PageSource<BorrowedBookResponse>> =
                Arc::new(ReturnedBookSource::new(network.clone()));
            let mut list = PageController::new(source, config.borrowed_page_size())
                .with_first_page_behavior(first_page);
            show_page(&mut list, args.index(), render_borrowed).await?;
        }
        Command::Archive { id, page } => {
            let mut screen = MyBooks::new(network.clone(), config.my_books_page_size(), first_page);
            load(screen.list_mut(), page.index()).await?;
            match screen.toggle_archived(id).await? {
                Some(archived) => println!("Book {} archived: {}", id, archived),
                None => println!("Book {} archive status toggled", id),
            }
        }
        Command::Share { id, page } => {
            let mut screen = MyBooks::new(network.clone(), config.my_books_page_size(), first_page);
            load(screen.list_mut(), page.index()).await?;
            match screen.toggle_shareable(id).await? {
                Some(shareable) => println!("Book {} shareable: {}", id, shareable),
                None => println!("Book {} shareable status toggled", id),
            }
        }
        Command::Add {
            id,
            title,
            author,
            isbn,
            synopsis,
            shareable,
            cover,
        } => {
            let request = BookRequest {
                id,
                title,
                author_name: author,
                isbn,
                synopsis,
                shareable,
            };
            let cover = match cover {
                Some(path) => Some(read_cover(&path).await?),
                None => None,
            };
            let mut screen = MyBooks::new(network.clone(), config.my_books_page_size(), first_page);
            let book_id = screen.save_book(&request, cover).await?;
            println!("Saved book {}", book_id);
        }
        Command::Cover { id, file } => {
            network.upload_cover(id, read_cover(&file).await?).await?;
            println!("Cover of book {} updated", id);
        }
        Command::Borrow { id } => {
            let transaction = network.borrow_book(id).await?;
            println!("Borrowed book {} (transaction {})", id, transaction);
        }
        Command::Return {
            id,
            page,
            comment,
            note,
        } => {
            let mut screen = BorrowedBookList::new(
                network.clone(),
                network.clone(),
                config.borrowed_page_size(),
                first_page,
            );
            load(screen.list_mut(), page.index()).await?;
            let Some(book) = screen.list().items().iter().find(|b| b.id == id).cloned() else {
                bail!("book {} is not on page {} of your borrowed books", id, page.page);
            };

            screen.select_for_return(&book);
            let with_feedback = comment.is_some() || note.is_some();
            if let Some(comment) = comment {
                screen.feedback_mut().comment = comment;
            }
            if let Some(note) = note {
                screen.feedback_mut().note = note;
            }

            let outcome = screen.return_selected(with_feedback).await?;
            println!("Returned book {}", outcome.book_id);
            match outcome.feedback {
                Some(Ok(feedback_id)) => println!("Feedback saved (id {})", feedback_id),
                Some(Err(err)) => eprintln!("Feedback was not saved: {}", err),
                None => {}
            }
        }
        Command::Approve { id } => {
            network.approve_return(id).await?;
            println!("Return of book {} approved", id);
        }
        Command::Feedback { id, comment, note } => {
            let request = FeedbackRequest {
                book_id: id,
                comment,
                note,
            };
            let feedback_id = network.save_feedback(&request).await?;
            println!("Feedback saved (id {})", feedback_id);
        }
        Command::Activate { code } => {
            let mut activation = AccountActivation::new(network.clone());
            activation.confirm(&code).await;
            println!("{}", activation.message());
            if !activation.is_okay() {
                bail!("account activation failed");
            }
        }
        Command::Login { email, password } => {
            network
                .authenticate(&AuthenticationRequest { email, password })
                .await?;
            match &config.token_file {
                Some(path) => println!("Logged in; token saved to {}", path.display()),
                None => println!("Logged in; set BOOKNET_TOKEN_FILE to keep the token"),
            }
        }
        Command::Register {
            firstname,
            lastname,
            email,
            password,
        } => {
            network
                .register(&RegistrationRequest {
                    firstname,
                    lastname,
                    email,
                    password,
                })
                .await?;
            println!("Account created; check your email for the activation code");
        }
    }

    Ok(())
}

async fn read_cover(path: &Path) -> anyhow::Result<CoverImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading cover {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cover".to_string());
    Ok(CoverImage::new(file_name, bytes))
}

async fn load<T: Send>(list: &mut PageController<T>, index: u32) -> anyhow::Result<()> {
    let outcome = list.go_to_page(index).await;
    info!(?outcome, index, "Page requested");
    if let ViewState::Error(reason) = list.view() {
        bail!("{}", reason);
    }
    Ok(())
}

async fn show_page<T: Send>(
    list: &mut PageController<T>,
    index: u32,
    render: fn(&T) -> String,
) -> anyhow::Result<()> {
    load(list, index).await?;

    let Some(page) = list.page() else {
        bail!("no page was loaded");
    };
    if page.is_empty() {
        println!("No books.");
        return Ok(());
    }
    for item in &page.content {
        println!("{}", render(item));
    }
    println!(
        "Page {} of {} ({} books)",
        list.cursor().index() + 1,
        page.total_pages.max(1),
        page.total_elements
    );
    Ok(())
}

fn render_book(book: &BookResponse) -> String {
    let mut flags = Vec::new();
    if book.archived {
        flags.push("archived");
    }
    if book.shareable {
        flags.push("shareable");
    }
    format!(
        "#{:<5} {} by {}{}",
        book.id,
        book.title.as_deref().unwrap_or("(untitled)"),
        book.author_name.as_deref().unwrap_or("unknown"),
        if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        }
    )
}

fn render_borrowed(book: &BorrowedBookResponse) -> String {
    let status = match (book.returned, book.return_approved) {
        (false, _) => "borrowed",
        (true, false) => "returned",
        (true, true) => "return approved",
    };
    format!(
        "#{:<5} {} by {} [{}]",
        book.id,
        book.title.as_deref().unwrap_or("(untitled)"),
        book.author_name.as_deref().unwrap_or("unknown"),
        status
    )
}
