//! BookOrigins CLI Client
//!
//! Command-line interface for browsing a running BookOrigins server.

use std::io::BufReader;
use std::net::TcpStream;
use std::path::PathBuf;
use std::process::ExitCode;

use bookorigins::draft::DraftStats;
use bookorigins::model::{Book, BookWithReviews, Chapter, NewReview, Publication, Review};
use bookorigins::protocol::{read_response, write_request, Method, Request, Response};
use bookorigins::{CatalogError, Result};
use clap::{Parser, Subcommand};

/// BookOrigins CLI
#[derive(Parser, Debug)]
#[command(name = "bookorigins-cli")]
#[command(about = "CLI for the BookOrigins catalog")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List published books
    List {
        /// Only books of this genre
        #[arg(short, long)]
        genre: Option<String>,

        /// Only books whose title, author or genre contains this text
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Show a book with its reviews
    Show {
        /// Book id
        id: u64,
    },

    /// List the chapters of a book
    Chapters {
        /// Book id
        id: u64,
    },

    /// Publish a book (or unpublish it)
    Publish {
        /// Book id
        id: u64,

        /// Hide the book from listings instead
        #[arg(long)]
        unpublish: bool,
    },

    /// Review a book
    Review {
        /// Book id
        book_id: u64,

        /// Rating from 1 to 5
        rating: i32,

        /// Optional comment
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Word count and reading time of a local draft file
    Stats {
        /// Path to a text file
        file: PathBuf,
    },

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    match &args.command {
        Commands::List { genre, search } => {
            let mut request = Request::new(Method::Get, "/api/books")?;
            if let Some(search) = search {
                request = request.with_query("search", search.as_str());
            }
            if let Some(genre) = genre {
                request = request.with_query("genre", genre.as_str());
            }
            let books: Vec<Book> = send(&args.server, request)?.json_body()?;
            for book in &books {
                print_book_line(book);
            }
            println!("{} book(s)", books.len());
        }
        Commands::Show { id } => {
            let request = Request::new(Method::Get, &format!("/api/books/{id}"))?;
            let book: BookWithReviews = send(&args.server, request)?.json_body()?;
            print_book_line(&book.book);
            println!("  {}", book.book.synopsis);
            for review in &book.reviews {
                print_review_line(review);
            }
        }
        Commands::Chapters { id } => {
            let request = Request::new(Method::Get, &format!("/api/books/{id}/chapters"))?;
            let chapters: Vec<Chapter> = send(&args.server, request)?.json_body()?;
            for chapter in &chapters {
                println!(
                    "{:>3}. {} ({} words)",
                    chapter.chapter_number, chapter.title, chapter.word_count
                );
            }
        }
        Commands::Publish { id, unpublish } => {
            let request = Request::new(Method::Put, &format!("/api/books/{id}/publication"))?
                .with_json(&Publication {
                    is_published: !unpublish,
                })?;
            let book: Book = send(&args.server, request)?.json_body()?;
            print_book_line(&book);
        }
        Commands::Review {
            book_id,
            rating,
            comment,
        } => {
            let request = Request::new(Method::Post, "/api/reviews")?.with_json(&NewReview {
                book_id: *book_id,
                user_id: None,
                rating: *rating,
                comment: comment.clone(),
                source: None,
            })?;
            let review: Review = send(&args.server, request)?.json_body()?;
            print_review_line(&review);
        }
        Commands::Stats { file } => {
            let text = std::fs::read_to_string(file)?;
            let stats = DraftStats::from_text(&text);
            println!("Words: {}", stats.word_count);
            println!("Reading time: {} min", stats.reading_minutes);
        }
        Commands::Ping => {
            let request = Request::new(Method::Get, "/api/health")?;
            send(&args.server, request)?;
            println!("PONG");
        }
    }
    Ok(())
}

/// Send one request on a fresh connection and return a successful response
fn send(server: &str, request: Request) -> Result<Response> {
    let request = request
        .with_header("Host", server)
        .with_header("Connection", "close");

    let mut stream = TcpStream::connect(server)?;
    write_request(&mut stream, &request)?;
    let response = read_response(&mut BufReader::new(stream))?;

    if !response.status.is_success() {
        let message = response
            .error_message()
            .unwrap_or_else(|| response.status.reason().to_string());
        return Err(CatalogError::Protocol(format!(
            "{} {}: {}",
            response.status.code(),
            response.status.reason(),
            message
        )));
    }
    Ok(response)
}

fn print_book_line(book: &Book) {
    let visibility = if book.is_published { "" } else { " [draft]" };
    println!(
        "#{} {} by {} ({}), rated {:.1} from {} reviews{}",
        book.id, book.title, book.author, book.genre, book.rating, book.review_count, visibility
    );
}

fn print_review_line(review: &Review) {
    println!(
        "  {}/5 via {}: {}",
        review.rating,
        review.source,
        review.comment.as_deref().unwrap_or("(no comment)")
    );
}
