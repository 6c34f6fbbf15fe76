//! Connection resolution.
//!
//! Turns the ordered connection specifications of a host into live
//! connections. Relative (chained) connections are handed the already
//! established connection whose `connection_id` they reference; building
//! the transport itself is left to a [`ConnectionFactory`].

use std::collections::BTreeMap;

use crate::models::{ConnectionModel, HostModel, TopologyModel};

/// Live connection built from a [`ConnectionModel`]
pub trait Connection {
    /// Specification the connection was built from
    fn model(&self) -> &ConnectionModel;
}

/// Transport-specific constructor of live connections
pub trait ConnectionFactory {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync + 'static;

    fn establish(
        &self,
        model: &ConnectionModel,
        relative: Option<&Self::Connection>,
    ) -> Result<Self::Connection, Self::Error>;
}

/// What to do when a relative connection's prerequisite was not resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelativePolicy {
    /// Build the connection without a relative one
    #[default]
    BestEffort,
    /// Fail the host's resolution
    Strict,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError<E: std::error::Error + 'static> {
    #[error("Cannot establish {connection_type} connection: {source}")]
    Establish {
        connection_type: String,
        #[source]
        source: E,
    },

    #[error("Relative connection with connection_id {relative_connection_id} was not established before {connection_type}")]
    MissingRelative {
        connection_type: String,
        relative_connection_id: u32,
    },
}

/// Resolution failure of one host within a topology
#[derive(Debug, thiserror::Error)]
#[error("Host {host} failed to connect: {source}")]
pub struct TopologyResolveError<E: std::error::Error + 'static> {
    pub host: String,
    #[source]
    pub source: ResolveError<E>,
}

/// Resolves connection specifications through a [`ConnectionFactory`]
pub struct ConnectionResolver<'f, F> {
    factory: &'f F,
    policy: RelativePolicy,
}

impl<'f, F: ConnectionFactory> ConnectionResolver<'f, F> {
    pub fn new(factory: &'f F) -> Self {
        Self {
            factory,
            policy: RelativePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RelativePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RelativePolicy {
        self.policy
    }

    /// Build one connection.
    ///
    /// An explicit `relative_connection` is used as is. Otherwise, when the
    /// spec is relative and `connection_list` is given, the prerequisite is
    /// looked up there by `connection_id`.
    pub fn resolve(
        &self,
        spec: &ConnectionModel,
        relative_connection: Option<&F::Connection>,
        connection_list: Option<&[F::Connection]>,
    ) -> Result<F::Connection, ResolveError<F::Error>> {
        let relative = match relative_connection {
            Some(relative) => Some(relative),
            None => self.find_relative(spec, connection_list)?,
        };

        self.factory
            .establish(spec, relative)
            .map_err(|source| ResolveError::Establish {
                connection_type: spec.connection_type().to_string(),
                source,
            })
    }

    fn find_relative<'c>(
        &self,
        spec: &ConnectionModel,
        connection_list: Option<&'c [F::Connection]>,
    ) -> Result<Option<&'c F::Connection>, ResolveError<F::Error>> {
        let (Some(relative_id), Some(connections)) = (spec.relative_connection_id(), connection_list) else {
            return Ok(None);
        };

        let found = connections
            .iter()
            .find(|connection| connection.model().connection_id() == Some(relative_id));
        if found.is_some() {
            return Ok(found);
        }

        match self.policy {
            RelativePolicy::BestEffort => {
                log::warn!(
                    "Relative connection with connection_id {} not found for {}, connecting without it",
                    relative_id,
                    spec.connection_type()
                );
                Ok(None)
            }
            RelativePolicy::Strict => Err(ResolveError::MissingRelative {
                connection_type: spec.connection_type().to_string(),
                relative_connection_id: relative_id,
            }),
        }
    }

    /// Build all connections of a host in order
    ///
    /// Host connections are already ordered so that prerequisites come first;
    /// each result is appended before the next spec is resolved.
    pub fn resolve_host(&self, host: &HostModel) -> Result<Vec<F::Connection>, ResolveError<F::Error>> {
        let mut connections = Vec::with_capacity(host.connections().len());
        for spec in host.connections() {
            let connection = self.resolve(spec, None, Some(connections.as_slice()))?;
            connections.push(connection);
        }
        log::debug!(
            "Established {} connection(s) for host {}",
            connections.len(),
            host.name().unwrap_or("<unnamed>")
        );
        Ok(connections)
    }

    /// Build connections of every host marked for instantiation
    pub fn resolve_topology(
        &self,
        topology: &TopologyModel,
    ) -> Result<BTreeMap<String, Vec<F::Connection>>, TopologyResolveError<F::Error>> {
        let mut resolved = BTreeMap::new();
        for host in topology.hosts().iter().filter(|host| host.instantiate()) {
            let name = host.name().unwrap_or_default().to_string();
            let connections = self.resolve_host(host).map_err(|source| TopologyResolveError {
                host: name.clone(),
                source,
            })?;
            resolved.insert(name, connections);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConnectionSpec, HostSpec};
    use std::cell::RefCell;

    #[derive(Debug)]
    struct FakeConnection {
        model: ConnectionModel,
        through: Option<u32>,
    }

    impl Connection for FakeConnection {
        fn model(&self) -> &ConnectionModel {
            &self.model
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("transport refused")]
    struct Refused;

    #[derive(Default)]
    struct FakeFactory {
        calls: RefCell<Vec<(String, Option<u32>)>>,
        refuse: Option<&'static str>,
    }

    impl ConnectionFactory for FakeFactory {
        type Connection = FakeConnection;
        type Error = Refused;

        fn establish(
            &self,
            model: &ConnectionModel,
            relative: Option<&FakeConnection>,
        ) -> Result<FakeConnection, Refused> {
            if self.refuse == Some(model.connection_type()) {
                return Err(Refused);
            }
            let through = relative.and_then(|r| r.model().connection_id());
            self.calls
                .borrow_mut()
                .push((model.connection_type().to_string(), through));
            Ok(FakeConnection {
                model: model.clone(),
                through,
            })
        }
    }

    fn network(id: u32) -> ConnectionModel {
        ConnectionModel::try_from(ConnectionSpec {
            connection_id: Some(id),
            ip_address: Some("10.10.10.10".parse().unwrap()),
            ..ConnectionSpec::new("RPyCConnection")
        })
        .unwrap()
    }

    fn serial(relative: u32) -> ConnectionModel {
        ConnectionModel::try_from(ConnectionSpec {
            relative_connection_id: Some(relative),
            ..ConnectionSpec::new("SerialConnection")
        })
        .unwrap()
    }

    fn host(name: &str, connections: Vec<ConnectionModel>) -> HostModel {
        HostModel::try_from(HostSpec {
            name: Some(name.to_string()),
            connections: Some(connections),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_resolve_without_relative() {
        let factory = FakeFactory::default();
        let resolver = ConnectionResolver::new(&factory);

        let connection = resolver.resolve(&network(1), None, None).unwrap();
        assert_eq!(connection.through, None);
        assert_eq!(factory.calls.borrow().as_slice(), &[("RPyCConnection".to_string(), None)]);
    }

    #[test]
    fn test_resolve_with_explicit_relative() {
        let factory = FakeFactory::default();
        let resolver = ConnectionResolver::new(&factory);

        let controller = resolver.resolve(&network(7), None, None).unwrap();
        let console = resolver.resolve(&serial(1), Some(&controller), None).unwrap();
        assert_eq!(console.through, Some(7));
    }

    #[test]
    fn test_resolve_from_connection_list() {
        let factory = FakeFactory::default();
        let resolver = ConnectionResolver::new(&factory);

        let list = vec![
            resolver.resolve(&network(1), None, None).unwrap(),
            resolver.resolve(&network(2), None, None).unwrap(),
        ];
        let console = resolver.resolve(&serial(2), None, Some(list.as_slice())).unwrap();
        assert_eq!(console.through, Some(2));
    }

    #[test]
    fn test_resolve_host_chains_relative_connections() {
        let factory = FakeFactory::default();
        let resolver = ConnectionResolver::new(&factory);

        let sut = host("sut", vec![serial(2), network(2), network(1)]);
        let connections = resolver.resolve_host(&sut).unwrap();

        let order: Vec<_> = connections.iter().map(|c| (c.model().connection_id(), c.through)).collect();
        assert_eq!(order, vec![(Some(1), None), (Some(2), None), (None, Some(2))]);
    }

    #[test]
    fn test_missing_relative_best_effort() {
        let factory = FakeFactory::default();
        let resolver = ConnectionResolver::new(&factory);

        let connections = resolver.resolve_host(&host("sut", vec![network(1), serial(5)])).unwrap();
        assert_eq!(connections.len(), 2);
        assert_eq!(connections[1].through, None);
    }

    #[test]
    fn test_missing_relative_strict() {
        let factory = FakeFactory::default();
        let resolver = ConnectionResolver::new(&factory).with_policy(RelativePolicy::Strict);

        let err = resolver.resolve_host(&host("sut", vec![network(1), serial(5)])).unwrap_err();
        assert!(matches!(err, ResolveError::MissingRelative { relative_connection_id: 5, .. }));
    }

    #[test]
    fn test_factory_error_is_propagated() {
        let factory = FakeFactory {
            refuse: Some("SerialConnection"),
            ..Default::default()
        };
        let resolver = ConnectionResolver::new(&factory);

        let err = resolver.resolve_host(&host("sut", vec![network(1), serial(1)])).unwrap_err();
        assert!(matches!(err, ResolveError::Establish { .. }));
        assert_eq!(factory.calls.borrow().len(), 1);
    }

    #[test]
    fn test_error_messages() {
        let establish = ResolveError::Establish {
            connection_type: "SerialConnection".to_string(),
            source: Refused,
        };
        assert_eq!(establish.to_string(), "Cannot establish SerialConnection connection: transport refused");

        let missing = ResolveError::<Refused>::MissingRelative {
            connection_type: "SerialConnection".to_string(),
            relative_connection_id: 5,
        };
        assert_eq!(
            missing.to_string(),
            "Relative connection with connection_id 5 was not established before SerialConnection"
        );

        let host = TopologyResolveError {
            host: "sut".to_string(),
            source: missing,
        };
        assert!(host.to_string().starts_with("Host sut failed to connect: Relative connection"));
        assert!(std::error::Error::source(&host).is_some());
    }

    #[test]
    fn test_resolve_topology_names_failing_host() {
        let factory = FakeFactory::default();
        let resolver = ConnectionResolver::new(&factory).with_policy(RelativePolicy::Strict);
        let topology = TopologyModel::try_from(crate::models::TopologySpec {
            hosts: Some(vec![host("client", vec![network(1)]), host("sut", vec![network(1), serial(5)])]),
            ..crate::models::TopologySpec::new(crate::models::SchemaMetadata::new("2.5").unwrap())
        })
        .unwrap();

        let err = resolver.resolve_topology(&topology).unwrap_err();
        assert_eq!(err.host, "sut");
        assert!(matches!(err.source, ResolveError::MissingRelative { relative_connection_id: 5, .. }));
    }
}
