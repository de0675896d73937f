use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use clap::{ArgAction, Args, Parser, Subcommand};
use chainscript::logger::{level_from_flags, ChainLogger};
use chainscript::{read_source, ChainEngine, ChainError, ChainResult, RunOptions};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli{
    #[command(subcommand)]
    command: Commands,
    /// Raise log verbosity, repeat for more.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose:u8,
    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet:bool,
    /// Do not print the memory after a run.
    #[arg(long, global = true)]
    no_memory:bool,
    /// Pre-seed a root variable, e.g. -D limit=10.
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE", global = true)]
    defines:Vec<String>
}
#[derive(Subcommand)]
enum Commands {
    /// Run a script file.
    Run(RunArgs),
    /// Run an inline script.
    Eval(SourceArgs),
    /// Print the token stream of a script.
    Tokens(SourceArgs),
    /// Print the parsed statements of a script.
    Ast(SourceArgs),
    /// Evaluate lines from stdin against one memory.
    Repl
}
#[derive(Args)]
struct RunArgs{
    path:String
}
#[derive(Args)]
struct SourceArgs{
    source:String
}

fn handle_chain_err(e:&ChainError,source:&str){
    if let Some(pos)=e.position(){
        let c:Vec<char>=source.chars().collect();
        let (row,col)=pos.get_row_col(&c);
        eprintln!("\x1b[31m  {}|{}   {}\x1b[0m",row+1,col+1,pos.get_raw_string(&c));
    }
    eprintln!("\x1b[31m[Error]:{e}\x1b[0m");
}

fn engine(cli:&Cli,options:RunOptions)->ChainResult<ChainEngine>{
    let mut engine=ChainEngine::new(options);
    for d in &cli.defines{
        engine.define_raw(d)?;
    }
    Ok(engine)
}

fn repl(cli:&Cli)->ChainResult<()>{
    let mut engine=engine(cli,RunOptions{show_results:true,show_memory:false})?;
    let stdin=io::stdin();
    print!("> ");
    io::stdout().flush()?;
    for line in stdin.lock().lines(){
        let line=line?;
        match line.trim() {
            ""=>{}
            ":memory"=>println!("{}",engine.memory()),
            ":quit"=>break,
            source=>if let Err(e)=engine.eval(source){
                handle_chain_err(&e,source);
            }
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}

fn cli(cli:&Cli)->Result<(),(ChainError,String)>{
    let options=RunOptions{show_results:true,show_memory:!cli.no_memory};
    match &cli.command {
        Commands::Run(args)=>{
            let source=read_source(&args.path).map_err(|e|(e,String::new()))?;
            let mut engine=engine(cli,options).map_err(|e|(e,String::new()))?;
            engine.eval(&source).map_err(|e|(e,source.clone()))?;
        }
        Commands::Eval(args)=>{
            let mut engine=engine(cli,options).map_err(|e|(e,String::new()))?;
            engine.eval(&args.source).map_err(|e|(e,args.source.clone()))?;
        }
        Commands::Tokens(args)=>{
            let tokens=ChainEngine::default().tokens(&args.source).map_err(|e|(e,args.source.clone()))?;
            for t in tokens{
                println!("{t}");
            }
        }
        Commands::Ast(args)=>{
            let ast=ChainEngine::default().compile(&args.source).map_err(|e|(e,args.source.clone()))?;
            println!("{ast:#?}");
        }
        Commands::Repl=>repl(cli).map_err(|e|(e,String::new()))?
    }
    Ok(())
}

fn main()->ExitCode{
    let args=Cli::parse();
    if ChainLogger::init(level_from_flags(args.verbose,args.quiet)).is_err(){
        eprintln!("\x1b[31m[Error]:logger already initialised\x1b[0m");
    }
    match cli(&args) {
        Ok(())=>ExitCode::SUCCESS,
        Err((e,source))=>{
            handle_chain_err(&e,&source);
            ExitCode::FAILURE
        }
    }
}
