/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `serve`   — Run the relay server
- `chat`    — Interactive chat client
- `history` — Browse saved conversation history

These handlers are intentionally small and use the library components:
the relay, the chat session, and the conversation store.
*/

// Interactive chat client handler
pub mod chat;

// Conversation history commands
pub mod history;

// Relay server runner
pub mod serve;

// Slash commands parser for the chat client
pub mod special_commands;
