//! k3d cluster lifecycle
//!
//! The replay cluster is a single k3s server with no agents, none of the
//! bundled add-ons and every controller that would reconcile the restored
//! objects switched off. Its store directory is a bind mount of the bundle's
//! `.kinesnap/db`.

use crate::error::ClusterResult;
use crate::runner::{CommandRunner, Invocation};
use std::path::Path;
use tracing::info;

/// k3d executable
pub const K3D_PROGRAM: &str = "k3d";

/// Store directory inside the server container
pub const DB_MOUNT_TARGET: &str = "/var/lib/rancher/k3s/server/db/";

/// Seconds `k3d create` waits for the server
pub const CREATE_WAIT_SECS: u32 = 60;

/// Server arguments passed on `create`
pub const SERVER_ARGS: &[&str] = &[
    "--disable-agent",
    "--no-deploy=coredns",
    "--no-deploy=servicelb",
    "--no-deploy=traefik",
    "--no-deploy=local-storage",
    "--no-deploy=metrics-server",
    "--kube-apiserver-arg=event-ttl=168h0m0s",
    "--kube-controller-arg=disable-attach-detach-reconcile-sync",
    "--kube-controller-arg=controllers=-attachdetach,-clusterrole-aggregation,-cronjob,-csrapproving,-csrcleaner,-csrsigning,-daemonset,-deployment,-disruption,-endpoint,-garbagecollector,-horizontalpodautoscaling,-job,-namespace,-nodeipam,-nodelifecycle,-persistentvolume-binder,-persistentvolume-expander,-podgc,-pv-protection,-pvc-protection,-replicaset,-replicationcontroller,-resourcequota,-root-ca-cert-publisher,-serviceaccount,-serviceaccount-token,-statefulset,-ttl",
    "--disable-scheduler",
    "--disable-cloud-controller",
    "--disable-network-policy",
    "--no-flannel",
];

/// Printed once the cluster is up
pub const KUBECONFIG_HINT: &str =
    "export KUBECONFIG=\"$(k3d get-kubeconfig --name='k3s-default')\"";

/// Drives k3d through a [`CommandRunner`]
#[derive(Debug, Clone)]
pub struct K3dCluster {
    program: String,
}

impl Default for K3dCluster {
    fn default() -> Self {
        K3dCluster {
            program: K3D_PROGRAM.to_string(),
        }
    }
}

impl K3dCluster {
    /// Use a different k3d executable
    pub fn with_program(program: impl Into<String>) -> Self {
        K3dCluster {
            program: program.into(),
        }
    }

    /// `k3d create` with `db_dir` mounted as the server's store directory
    pub fn create_invocation(&self, db_dir: &Path) -> Invocation {
        let mut args = vec![
            "create".to_string(),
            "--workers".to_string(),
            "0".to_string(),
            "--volume".to_string(),
            format!("{}:{}", db_dir.display(), DB_MOUNT_TARGET),
        ];
        for arg in SERVER_ARGS {
            args.push("--server-arg".to_string());
            args.push((*arg).to_string());
        }
        args.push("--wait".to_string());
        args.push(CREATE_WAIT_SECS.to_string());
        Invocation::new(self.program.clone(), args)
    }

    /// Create the cluster
    pub fn create(&self, runner: &mut dyn CommandRunner, db_dir: &Path) -> ClusterResult<()> {
        info!("Creating k3d cluster");
        runner.run(&self.create_invocation(db_dir))
    }

    /// Stop every cluster
    pub fn stop(&self, runner: &mut dyn CommandRunner) -> ClusterResult<()> {
        info!("Stopping k3d cluster");
        runner.run(&self.all("stop"))
    }

    /// Start every cluster
    pub fn start(&self, runner: &mut dyn CommandRunner) -> ClusterResult<()> {
        info!("Starting k3d cluster");
        runner.run(&self.all("start"))
    }

    /// Delete every cluster
    pub fn delete(&self, runner: &mut dyn CommandRunner) -> ClusterResult<()> {
        info!("Deleting k3d cluster");
        runner.run(&self.all("delete"))
    }

    fn all(&self, verb: &str) -> Invocation {
        Invocation::new(self.program.clone(), [verb, "--all"])
    }
}
