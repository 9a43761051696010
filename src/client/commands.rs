//! Command Catalogue
//!
//! Friendly methods over [`Client::execute`]. Each one only shapes a command
//! name and its arguments; decoding, retrying and error reporting all happen
//! in the client.
//!
//! ## Commands
//!
//! ### Keys
//! - `has` (`EXISTS`), `get` (`EXISTS` then `GET`), `set` (`SET` / `SETEX`)
//! - `del` / `remove` (`DEL`), `persist` (`PERSIST`), `find_keys` (`KEYS`)
//!
//! ### Lists
//! - `list_push` (`RPUSH` / `LPUSH`), `list_pop` (`RPOP` / `LPOP`)
//! - `list_get` (`LINDEX`), `list_set` (`LSET`), `list_get_range` (`LRANGE`)
//! - `list_length` (`LLEN`)
//!
//! ### Hashes
//! - `hash_get` (`HGET`), `hash_set` (`HSET`), `hash_delete` (`HDEL`)
//!
//! ### Server
//! - `authenticate` (`AUTH`), `flush` (`FLUSHDB`), `get_stats` (`INFO`)
//! - `get_parameter` / `set_parameter` (`CONFIG GET` / `CONFIG SET`)
//! - `get_size` (`DBSIZE`)

use crate::client::Client;
use crate::error::{Error, Result};
use crate::protocol::{Arg, Command, Reply};
use crate::transport::Connector;

/// Which end of a list to push to or pop from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListEnd {
    Left,
    #[default]
    Right,
}

impl<C: Connector> Client<C> {
    /// Returns true if `key` exists.
    pub fn has(&mut self, key: impl Arg) -> Result<bool> {
        let reply = self.execute(&Command::new("exists").arg(key))?;
        Ok(reply.is_truthy())
    }

    /// Returns the value at `key`, failing with [`Error::KeyNotFound`] if the
    /// key does not exist.
    pub fn get(&mut self, key: impl Arg) -> Result<Reply> {
        let key = key.to_arg();
        if !self.has(&key)? {
            let missing = String::from_utf8_lossy(&key).into_owned();
            return Err(self.fail(Error::KeyNotFound(missing)));
        }
        self.execute(&Command::new("get").arg(key))
    }

    /// Sets `key` to `value`, with an expiry in seconds if given.
    pub fn set(&mut self, key: impl Arg, value: impl Arg, expire: Option<u64>) -> Result<Reply> {
        let cmd = match expire {
            Some(seconds) => Command::new("setex").arg(key).arg(seconds).arg(value),
            None => Command::new("set").arg(key).arg(value),
        };
        self.execute(&cmd)
    }

    pub fn del(&mut self, key: impl Arg) -> Result<Reply> {
        self.execute(&Command::new("del").arg(key))
    }

    /// Same as [`del`](Client::del).
    pub fn remove(&mut self, key: impl Arg) -> Result<Reply> {
        self.del(key)
    }

    pub fn persist(&mut self, key: impl Arg) -> Result<Reply> {
        self.execute(&Command::new("persist").arg(key))
    }

    /// Keys matching a glob pattern, `*` for all.
    pub fn find_keys(&mut self, pattern: impl Arg) -> Result<Reply> {
        self.execute(&Command::new("keys").arg(pattern))
    }

    pub fn list_push(&mut self, list: impl Arg, value: impl Arg, end: ListEnd) -> Result<Reply> {
        let name = match end {
            ListEnd::Left => "lpush",
            ListEnd::Right => "rpush",
        };
        self.execute(&Command::new(name).arg(list).arg(value))
    }

    pub fn list_pop(&mut self, list: impl Arg, end: ListEnd) -> Result<Reply> {
        let name = match end {
            ListEnd::Left => "lpop",
            ListEnd::Right => "rpop",
        };
        self.execute(&Command::new(name).arg(list))
    }

    pub fn list_get(&mut self, list: impl Arg, index: i64) -> Result<Reply> {
        self.execute(&Command::new("lindex").arg(list).arg(index))
    }

    pub fn list_set(&mut self, list: impl Arg, index: i64, value: impl Arg) -> Result<Reply> {
        self.execute(&Command::new("lset").arg(list).arg(index).arg(value))
    }

    pub fn list_get_range(&mut self, list: impl Arg, first: i64, last: i64) -> Result<Reply> {
        self.execute(&Command::new("lrange").arg(list).arg(first).arg(last))
    }

    pub fn list_length(&mut self, list: impl Arg) -> Result<Reply> {
        self.execute(&Command::new("llen").arg(list))
    }

    pub fn hash_get(&mut self, hash: impl Arg, field: impl Arg) -> Result<Reply> {
        self.execute(&Command::new("hget").arg(hash).arg(field))
    }

    /// Returns true if a new field was created.
    pub fn hash_set(&mut self, hash: impl Arg, field: impl Arg, value: impl Arg) -> Result<bool> {
        let reply = self.execute(&Command::new("hset").arg(hash).arg(field).arg(value))?;
        Ok(reply.is_truthy())
    }

    /// Returns true if the field existed.
    pub fn hash_delete(&mut self, hash: impl Arg, field: impl Arg) -> Result<bool> {
        let reply = self.execute(&Command::new("hdel").arg(hash).arg(field))?;
        Ok(reply.is_truthy())
    }

    pub fn authenticate(&mut self, password: impl Arg) -> Result<Reply> {
        self.execute(&Command::new("auth").arg(password))
    }

    pub fn flush(&mut self) -> Result<Reply> {
        self.execute(&Command::new("flushdb"))
    }

    pub fn get_stats(&mut self) -> Result<Reply> {
        self.execute(&Command::new("info"))
    }

    pub fn get_parameter(&mut self, name: impl Arg) -> Result<Reply> {
        self.execute(&Command::new("config").arg("GET").arg(name))
    }

    pub fn set_parameter(&mut self, name: impl Arg, value: impl Arg) -> Result<Reply> {
        self.execute(&Command::new("config").arg("SET").arg(name).arg(value))
    }

    pub fn get_size(&mut self) -> Result<Reply> {
        self.execute(&Command::new("dbsize"))
    }
}
