mod cli;
mod writer;
